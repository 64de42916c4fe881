//! In-memory type-rule repository.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_entity::type_rule::{TypeRule, TypeRuleInput};

use crate::traits::TypeRuleRepository;

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    rules: BTreeMap<i64, TypeRule>,
}

/// Rule repository holding rows in memory.
///
/// [`set_unavailable`](Self::set_unavailable) makes every read fail, which
/// lets callers exercise their degraded paths.
#[derive(Debug, Default)]
pub struct MemoryTypeRuleRepository {
    state: RwLock<State>,
    unavailable: AtomicBool,
    reads: AtomicU64,
}

impl MemoryTypeRuleRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backing store going away (or coming back).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `list_enabled` calls served so far.
    pub fn enabled_reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::database("Type rule store is unavailable"));
        }
        Ok(())
    }

    fn sorted(mut rules: Vec<TypeRule>) -> Vec<TypeRule> {
        rules.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        rules
    }
}

fn duplicate(state: &State, mime_type: &str, except: Option<i64>) -> bool {
    state
        .rules
        .values()
        .any(|r| Some(r.id) != except && r.mime_type.eq_ignore_ascii_case(mime_type))
}

#[async_trait]
impl TypeRuleRepository for MemoryTypeRuleRepository {
    async fn list_all(&self) -> AppResult<Vec<TypeRule>> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(Self::sorted(state.rules.values().cloned().collect()))
    }

    async fn list_enabled(&self) -> AppResult<Vec<TypeRule>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let state = self.state.read().await;
        Ok(Self::sorted(
            state.rules.values().filter(|r| r.is_enabled).cloned().collect(),
        ))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<TypeRule>> {
        self.check_available()?;
        Ok(self.state.read().await.rules.get(&id).cloned())
    }

    async fn list_by_category(&self, category: &str) -> AppResult<Vec<TypeRule>> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut rules: Vec<TypeRule> = state
            .rules
            .values()
            .filter(|r| r.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect();
        rules.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(rules)
    }

    async fn create(&self, input: &TypeRuleInput) -> AppResult<TypeRule> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if duplicate(&state, &input.mime_type, None) {
            return Err(AppError::conflict("A rule for this MIME type already exists"));
        }
        state.next_id += 1;
        let rule = TypeRule {
            id: state.next_id,
            mime_type: input.mime_type.clone(),
            extensions: input.extensions.clone(),
            category: input.category.clone(),
            max_size_mb: input.max_size_mb,
            is_enabled: input.is_enabled,
            display_name: input.display_name.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        state.rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn update(&self, id: i64, input: &TypeRuleInput) -> AppResult<Option<TypeRule>> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if duplicate(&state, &input.mime_type, Some(id)) {
            return Err(AppError::conflict("A rule for this MIME type already exists"));
        }
        let Some(rule) = state.rules.get_mut(&id) else {
            return Ok(None);
        };
        rule.mime_type = input.mime_type.clone();
        rule.extensions = input.extensions.clone();
        rule.category = input.category.clone();
        rule.max_size_mb = input.max_size_mb;
        rule.is_enabled = input.is_enabled;
        rule.display_name = input.display_name.clone();
        rule.updated_at = Some(Utc::now());
        Ok(Some(rule.clone()))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        self.check_available()?;
        Ok(self.state.write().await.rules.remove(&id).is_some())
    }

    async fn toggle(&self, id: i64) -> AppResult<Option<TypeRule>> {
        self.check_available()?;
        let mut state = self.state.write().await;
        Ok(state.rules.get_mut(&id).map(|rule| {
            rule.is_enabled = !rule.is_enabled;
            rule.updated_at = Some(Utc::now());
            rule.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(mime: &str, ext: &str) -> TypeRuleInput {
        TypeRuleInput {
            mime_type: mime.to_string(),
            extensions: ext.to_string(),
            category: "Image".to_string(),
            max_size_mb: 10,
            is_enabled: true,
            display_name: mime.to_string(),
        }
    }

    #[tokio::test]
    async fn test_toggle_and_enabled_listing() {
        let repo = MemoryTypeRuleRepository::new();
        let png = repo.create(&input("image/png", ".png")).await.unwrap();
        repo.create(&input("image/gif", ".gif")).await.unwrap();

        let toggled = repo.toggle(png.id).await.unwrap().unwrap();
        assert!(!toggled.is_enabled);
        assert_eq!(repo.list_enabled().await.unwrap().len(), 1);
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
        assert!(repo.toggle(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_mime_is_conflict() {
        let repo = MemoryTypeRuleRepository::new();
        repo.create(&input("image/png", ".png")).await.unwrap();
        let err = repo.create(&input("IMAGE/PNG", ".png")).await.unwrap_err();
        assert_eq!(err.kind, assethub_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_unavailable_fails_reads() {
        let repo = MemoryTypeRuleRepository::new();
        repo.set_unavailable(true);
        assert!(repo.list_enabled().await.is_err());
        repo.set_unavailable(false);
        assert!(repo.list_enabled().await.unwrap().is_empty());
    }
}
