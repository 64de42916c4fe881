//! Upload validation against the enabled type rules.

use std::sync::Arc;

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_entity::type_rule::{TypeRule, normalize_extension};

use super::store::TypeRuleStore;

/// Accepts or rejects a candidate file by content type, extension and size.
#[derive(Debug, Clone)]
pub struct FileValidator {
    rules: Arc<TypeRuleStore>,
}

impl FileValidator {
    /// Creates a new validator reading from the given store.
    pub fn new(rules: Arc<TypeRuleStore>) -> Self {
        Self { rules }
    }

    /// Validate a candidate. Rejections are `ErrorKind::Validation` errors
    /// naming the offending type or the exceeded limit.
    pub async fn validate(&self, content_type: &str, extension: &str, size_bytes: i64) -> AppResult<()> {
        let rules = self.rules.list_enabled().await;
        check(&rules, content_type, extension, size_bytes)
    }
}

/// Validate a candidate against an explicit rule set.
pub fn check(rules: &[TypeRule], content_type: &str, extension: &str, size_bytes: i64) -> AppResult<()> {
    let extension = normalize_extension(extension);
    let content_type = content_type.trim();

    let rule = rules
        .iter()
        .filter(|r| r.is_enabled)
        .find(|r| r.matches(content_type, &extension))
        .ok_or_else(|| {
            AppError::validation(format!(
                "File type '{extension}' ({content_type}) is not allowed"
            ))
        })?;

    if size_bytes > rule.max_size_bytes() {
        return Err(AppError::validation(format!(
            "File size exceeds the {}MB limit for {}",
            rule.max_size_mb, rule.display_name
        )));
    }
    Ok(())
}
