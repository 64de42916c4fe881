//! Migration report produced by preview and execute runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome for a single candidate asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    /// Computed in preview; nothing was changed.
    Pending,
    /// Copied, repointed and backed up.
    Success,
    /// A step failed; see the item's error message.
    Error,
    /// The legacy source file was not present.
    FileNotFound,
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
            Self::FileNotFound => "file_not_found",
        };
        write!(f, "{s}")
    }
}

/// One candidate asset in a migration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationItem {
    /// Asset identity.
    pub file_id: i64,
    /// Legacy storage path.
    pub old_path: String,
    /// Identity-derived storage path.
    pub new_path: String,
    /// Outcome.
    pub status: MigrationStatus,
    /// Failure detail for `error` and `file_not_found`.
    pub error: Option<String>,
}

/// Aggregated result of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// True for preview runs.
    pub is_preview: bool,
    /// Assets examined.
    pub total_assets: usize,
    /// Assets whose stored filename follows the legacy pattern.
    pub needs_migration: usize,
    /// Assets skipped because their filename is not legacy-shaped.
    pub already_migrated: usize,
    /// Items migrated successfully.
    pub success_count: usize,
    /// Items that failed.
    pub error_count: usize,
    /// Items whose source file was absent.
    pub file_not_found_count: usize,
    /// Per-candidate detail.
    pub items: Vec<MigrationItem>,
}

impl MigrationReport {
    /// Start an empty report.
    pub fn new(is_preview: bool) -> Self {
        Self {
            is_preview,
            ..Self::default()
        }
    }

    /// Record an item and bump the matching counter.
    pub fn record(&mut self, item: MigrationItem) {
        match item.status {
            MigrationStatus::Success => self.success_count += 1,
            MigrationStatus::Error => self.error_count += 1,
            MigrationStatus::FileNotFound => self.file_not_found_count += 1,
            MigrationStatus::Pending => {}
        }
        self.items.push(item);
    }

    /// Counts-only JSON summary for logs and the audit trail.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "is_preview": self.is_preview,
            "total_assets": self.total_assets,
            "needs_migration": self.needs_migration,
            "already_migrated": self.already_migrated,
            "success_count": self.success_count,
            "error_count": self.error_count,
            "file_not_found_count": self.file_not_found_count,
        })
    }
}
