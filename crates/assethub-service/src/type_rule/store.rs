//! Type-rule store: administered rules behind a read-through cache with a
//! compiled-in fallback.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use assethub_cache::{CacheManager, keys};
use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::traits::cache::CacheProvider;
use assethub_database::TypeRuleRepository;
use assethub_entity::asset::AssetCategory;
use assethub_entity::type_rule::{TypeRule, TypeRuleInput};

use super::source::{FallbackRules, LiveRules, RuleSource};

/// Serves enabled rules for validation and handles rule administration.
#[derive(Debug, Clone)]
pub struct TypeRuleStore {
    /// Rule table, used for administration.
    repo: Arc<dyn TypeRuleRepository>,
    /// Primary source of enabled rules.
    live: Arc<dyn RuleSource>,
    /// Last-resort source when the primary is empty or failing.
    fallback: Arc<dyn RuleSource>,
    /// Cache holding the enabled rule list.
    cache: Arc<CacheManager>,
    /// How long the enabled list stays cached.
    ttl: Duration,
}

impl TypeRuleStore {
    /// Creates a new type-rule store.
    pub fn new(repo: Arc<dyn TypeRuleRepository>, cache: Arc<CacheManager>, ttl: Duration) -> Self {
        Self {
            live: Arc::new(LiveRules::new(Arc::clone(&repo))),
            fallback: Arc::new(FallbackRules),
            repo,
            cache,
            ttl,
        }
    }

    /// Enabled rules. Never fails: a cache problem falls through to the rule
    /// table, and an empty or unreachable table yields the fallback rules.
    pub async fn list_enabled(&self) -> Vec<TypeRule> {
        let key = keys::enabled_type_rules();

        match self.cache.get_json::<Vec<TypeRule>>(&key).await {
            Ok(Some(rules)) if !rules.is_empty() => return rules,
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Type rule cache read failed"),
        }

        match self.live.enabled_rules().await {
            Ok(rules) if !rules.is_empty() => {
                if let Err(e) = self.cache.set_json(&key, &rules, self.ttl).await {
                    warn!(error = %e, "Failed to cache enabled type rules");
                }
                debug!(source = self.live.name(), count = rules.len(), "Loaded type rules");
                return rules;
            }
            Ok(_) => warn!(
                source = self.live.name(),
                "No enabled type rules configured, using fallback rules"
            ),
            Err(e) => warn!(
                source = self.live.name(),
                error = %e,
                "Type rule store unavailable, using fallback rules"
            ),
        }

        // The fallback set is not cached so the live table is retried next call.
        self.fallback
            .enabled_rules()
            .await
            .unwrap_or_else(|_| FallbackRules::rules())
    }

    /// Every rule, enabled or not, straight from the table.
    pub async fn list_all(&self) -> AppResult<Vec<TypeRule>> {
        self.repo.list_all().await
    }

    /// A single rule.
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<TypeRule>> {
        self.repo.find_by_id(id).await
    }

    /// Rules in a category.
    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<TypeRule>> {
        let category: AssetCategory = category.parse()?;
        self.repo.list_by_category(category.as_str()).await
    }

    /// Create a rule.
    pub async fn create(&self, input: TypeRuleInput) -> AppResult<TypeRule> {
        let input = Self::prepare(input)?;
        let rule = self.repo.create(&input).await?;
        self.invalidate().await;
        info!(rule_id = rule.id, mime_type = %rule.mime_type, "Type rule created");
        Ok(rule)
    }

    /// Replace a rule's fields. `None` if the rule does not exist.
    pub async fn update(&self, id: i64, input: TypeRuleInput) -> AppResult<Option<TypeRule>> {
        let input = Self::prepare(input)?;
        let rule = self.repo.update(id, &input).await?;
        self.invalidate().await;
        if rule.is_some() {
            info!(rule_id = id, "Type rule updated");
        }
        Ok(rule)
    }

    /// Delete a rule. `false` if it did not exist.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let deleted = self.repo.delete(id).await?;
        self.invalidate().await;
        if deleted {
            info!(rule_id = id, "Type rule deleted");
        }
        Ok(deleted)
    }

    /// Flip a rule's enabled flag. `None` if the rule does not exist.
    pub async fn toggle(&self, id: i64) -> AppResult<Option<TypeRule>> {
        let rule = self.repo.toggle(id).await?;
        self.invalidate().await;
        if let Some(rule) = &rule {
            info!(rule_id = id, enabled = rule.is_enabled, "Type rule toggled");
        }
        Ok(rule)
    }

    /// Drop the cached enabled list.
    pub async fn invalidate(&self) {
        if let Err(e) = self.cache.delete(&keys::enabled_type_rules()).await {
            warn!(error = %e, "Failed to invalidate type rule cache");
        }
    }

    fn prepare(input: TypeRuleInput) -> AppResult<TypeRuleInput> {
        let mut input = input.normalized();
        let category: AssetCategory = input.category.parse()?;
        input.category = category.as_str().to_string();
        if input.mime_type.is_empty() || input.extensions.is_empty() {
            return Err(AppError::validation(
                "A type rule needs a MIME type and at least one extension",
            ));
        }
        if input.max_size_mb <= 0 {
            return Err(AppError::validation("max_size_mb must be positive"));
        }
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assethub_database::memory::MemoryTypeRuleRepository;

    fn input(mime: &str, exts: &str, category: &str, max_mb: i32) -> TypeRuleInput {
        TypeRuleInput {
            mime_type: mime.to_string(),
            extensions: exts.to_string(),
            category: category.to_string(),
            max_size_mb: max_mb,
            is_enabled: true,
            display_name: format!("{mime} rule"),
        }
    }

    fn store(repo: &Arc<MemoryTypeRuleRepository>) -> TypeRuleStore {
        TypeRuleStore::new(
            repo.clone(),
            Arc::new(CacheManager::in_memory()),
            Duration::from_secs(600),
        )
    }

    #[tokio::test]
    async fn test_empty_table_yields_fallback() {
        let repo = Arc::new(MemoryTypeRuleRepository::new());
        let store = store(&repo);

        let rules = store.list_enabled().await;
        assert_eq!(rules.len(), FallbackRules::rules().len());

        // Fallback is not cached, so the table is consulted again.
        store.list_enabled().await;
        assert_eq!(repo.enabled_reads(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_table_yields_fallback() {
        let repo = Arc::new(MemoryTypeRuleRepository::new());
        let store = store(&repo);
        store.create(input("image/png", "png", "image", 20)).await.unwrap();

        repo.set_unavailable(true);
        store.invalidate().await;
        let rules = store.list_enabled().await;
        assert_eq!(rules, FallbackRules::rules());
    }

    #[tokio::test]
    async fn test_enabled_rules_are_cached_until_a_write() {
        let repo = Arc::new(MemoryTypeRuleRepository::new());
        let store = store(&repo);
        let png = store.create(input("image/png", ".PNG", "Image", 20)).await.unwrap();
        assert_eq!(png.extensions, ".png");
        assert_eq!(png.category, "Image");

        assert_eq!(store.list_enabled().await.len(), 1);
        assert_eq!(store.list_enabled().await.len(), 1);
        assert_eq!(repo.enabled_reads(), 1);

        store.create(input("application/pdf", "pdf", "Document", 20)).await.unwrap();
        assert_eq!(store.list_enabled().await.len(), 2);
        assert_eq!(repo.enabled_reads(), 2);

        store.toggle(png.id).await.unwrap();
        let rules = store.list_enabled().await;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_rejects_unknown_category() {
        let repo = Arc::new(MemoryTypeRuleRepository::new());
        let store = store(&repo);
        let err = store
            .create(input("text/plain", ".txt", "Spreadsheet", 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind, assethub_core::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_missing_rule_mutations_report_absence() {
        let repo = Arc::new(MemoryTypeRuleRepository::new());
        let store = store(&repo);
        assert!(store.toggle(99).await.unwrap().is_none());
        assert!(!store.delete(99).await.unwrap());
        assert!(store
            .update(99, input("image/png", ".png", "Image", 5))
            .await
            .unwrap()
            .is_none());
    }
}
