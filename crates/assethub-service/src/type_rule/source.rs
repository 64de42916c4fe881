//! Where enabled type rules come from.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use assethub_core::result::AppResult;
use assethub_database::TypeRuleRepository;
use assethub_entity::asset::AssetCategory;
use assethub_entity::type_rule::TypeRule;

/// A provider of the enabled rule set.
#[async_trait]
pub trait RuleSource: Send + Sync + std::fmt::Debug + 'static {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Currently enabled rules.
    async fn enabled_rules(&self) -> AppResult<Vec<TypeRule>>;
}

/// Rules read from the administered rule table.
#[derive(Debug, Clone)]
pub struct LiveRules {
    repo: Arc<dyn TypeRuleRepository>,
}

impl LiveRules {
    /// Wrap a rule repository.
    pub fn new(repo: Arc<dyn TypeRuleRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl RuleSource for LiveRules {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn enabled_rules(&self) -> AppResult<Vec<TypeRule>> {
        self.repo.list_enabled().await
    }
}

/// Compiled-in rules used when the rule table is empty or unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackRules;

/// `(mime_type, extensions, category, max_size_mb, display_name)`
const FALLBACK: &[(&str, &str, AssetCategory, i32, &str)] = &[
    ("image/jpeg", ".jpg,.jpeg", AssetCategory::Image, 20, "JPEG Image"),
    ("image/png", ".png", AssetCategory::Image, 20, "PNG Image"),
    ("image/gif", ".gif", AssetCategory::Image, 10, "GIF Image"),
    ("image/webp", ".webp", AssetCategory::Image, 20, "WebP Image"),
    ("image/svg+xml", ".svg", AssetCategory::Image, 5, "SVG Image"),
    ("video/mp4", ".mp4", AssetCategory::Video, 100, "MP4 Video"),
    ("video/webm", ".webm", AssetCategory::Video, 100, "WebM Video"),
    ("video/ogg", ".ogg", AssetCategory::Video, 100, "Ogg Video"),
    ("video/quicktime", ".mov", AssetCategory::Video, 100, "QuickTime Video"),
    ("application/pdf", ".pdf", AssetCategory::Document, 20, "PDF Document"),
    ("application/msword", ".doc", AssetCategory::Document, 20, "Word Document"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
        AssetCategory::Document,
        20,
        "Word Document (DOCX)",
    ),
];

impl FallbackRules {
    /// The compiled-in rule set. Fallback rules carry id 0.
    pub fn rules() -> Vec<TypeRule> {
        let created_at = DateTime::<Utc>::UNIX_EPOCH;
        FALLBACK
            .iter()
            .map(|(mime, exts, category, max_mb, display)| TypeRule {
                id: 0,
                mime_type: (*mime).to_string(),
                extensions: (*exts).to_string(),
                category: category.as_str().to_string(),
                max_size_mb: *max_mb,
                is_enabled: true,
                display_name: (*display).to_string(),
                created_at,
                updated_at: None,
            })
            .collect()
    }
}

#[async_trait]
impl RuleSource for FallbackRules {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn enabled_rules(&self) -> AppResult<Vec<TypeRule>> {
        Ok(Self::rules())
    }
}
