//! Upload type rule entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Bytes per megabyte used for size ceilings.
pub const BYTES_PER_MB: i64 = 1_048_576;

/// An administrator-managed rule describing an accepted file type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TypeRule {
    /// Rule identifier (0 for compiled-in fallback rules).
    pub id: i64,
    /// MIME type, e.g. `image/jpeg`.
    pub mime_type: String,
    /// Comma-separated extensions with leading dots, e.g. `.jpg,.jpeg`.
    pub extensions: String,
    /// Category name (`Image`, `Video`, `Audio`, `Document`).
    pub category: String,
    /// Maximum accepted size in megabytes.
    pub max_size_mb: i32,
    /// Whether uploads are accepted under this rule.
    pub is_enabled: bool,
    /// Human readable name used in rejection messages.
    pub display_name: String,
    /// When the rule was created.
    pub created_at: DateTime<Utc>,
    /// When the rule was last edited.
    pub updated_at: Option<DateTime<Utc>>,
}

impl TypeRule {
    /// Individual extensions, trimmed and lower-cased.
    pub fn extension_list(&self) -> Vec<String> {
        self.extensions
            .split(',')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    /// Whether a candidate matches by MIME type or by (normalized) extension.
    pub fn matches(&self, content_type: &str, extension: &str) -> bool {
        if self.mime_type.eq_ignore_ascii_case(content_type.trim()) {
            return true;
        }
        !extension.is_empty() && self.extension_list().iter().any(|e| e == extension)
    }

    /// Size ceiling in bytes.
    pub fn max_size_bytes(&self) -> i64 {
        i64::from(self.max_size_mb) * BYTES_PER_MB
    }
}

/// Editable fields of a type rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRuleInput {
    /// MIME type.
    pub mime_type: String,
    /// Comma-separated extensions (normalized on write).
    pub extensions: String,
    /// Category name.
    pub category: String,
    /// Maximum size in megabytes.
    pub max_size_mb: i32,
    /// Whether the rule is active.
    pub is_enabled: bool,
    /// Display name.
    pub display_name: String,
}

impl TypeRuleInput {
    /// Trim text fields, lower-case the MIME type and normalize extensions.
    pub fn normalized(mut self) -> Self {
        self.mime_type = self.mime_type.trim().to_lowercase();
        self.extensions = normalize_extension_list(&self.extensions);
        self.category = self.category.trim().to_string();
        self.display_name = self.display_name.trim().to_string();
        self
    }
}

/// Lower-case an extension and ensure a single leading dot.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_lowercase();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{trimmed}")
    }
}

/// Normalize every entry of a comma-separated extension list.
pub fn normalize_extension_list(extensions: &str) -> String {
    extensions
        .split(',')
        .map(normalize_extension)
        .filter(|e| !e.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
