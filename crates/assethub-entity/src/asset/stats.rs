//! Aggregate asset statistics.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registry-wide totals plus per-category and per-folder breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetStats {
    /// All finalized assets, deleted or not.
    pub total_assets: i64,
    /// Assets not soft-deleted.
    pub active_assets: i64,
    /// Soft-deleted assets.
    pub deleted_assets: i64,
    /// Bytes held by all finalized assets (soft-deleted bytes are not purged).
    pub total_size_bytes: i64,
    /// Active assets grouped by derived category.
    pub by_category: Vec<CategoryStat>,
    /// Active assets grouped by folder.
    pub by_folder: Vec<FolderStat>,
}

/// Count and size for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CategoryStat {
    /// Category name.
    pub category: String,
    /// Number of assets.
    pub file_count: i64,
    /// Sum of sizes in bytes.
    pub total_size_bytes: i64,
}

/// Count and size for one folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FolderStat {
    /// Folder name.
    pub folder: String,
    /// Number of assets.
    pub file_count: i64,
    /// Sum of sizes in bytes.
    pub total_size_bytes: i64,
}
