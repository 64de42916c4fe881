//! Asset entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::category::AssetCategory;

/// Placeholder stored in `file_name` and `storage_path` until the bytes
/// of a provisional row have been written.
pub const PENDING_PLACEHOLDER: &str = "pending";

/// Folder assumed for assets that have none recorded.
pub const DEFAULT_FOLDER: &str = "misc";

/// An uploaded file's metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Asset {
    /// Surrogate identity, allocated once by the registry and never reused.
    pub file_id: i64,
    /// Stored filename, `{file_id}{ext}` once finalized.
    pub file_name: String,
    /// Filename as supplied by the uploader.
    pub original_file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Backend holding the bytes (`local`, `s3`).
    pub storage_provider: String,
    /// Location within the backend, `{folder}/{yyyy-MM}/{file_id}{ext}`.
    pub storage_path: String,
    /// Logical grouping supplied by the caller.
    pub folder: Option<String>,
    /// Owning entity type (weak reference).
    pub object_type: Option<String>,
    /// Owning entity id (weak reference).
    pub object_id: Option<i64>,
    /// Uploading actor.
    pub uploaded_by: Option<i64>,
    /// Free-form display status.
    pub status: Option<String>,
    /// Display ordering within an owning object.
    pub sort_order: i32,
    /// Display caption.
    pub caption: Option<String>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// When the asset was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Set once at provisional creation.
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Whether the row is still provisional (bytes not yet written).
    pub fn is_pending(&self) -> bool {
        self.storage_path == PENDING_PLACEHOLDER
    }

    /// Category derived from the content type.
    pub fn category(&self) -> AssetCategory {
        AssetCategory::from_content_type(&self.content_type)
    }

    /// Lower-cased extension (with leading dot) of the original filename,
    /// or an empty string when it has none.
    pub fn original_extension(&self) -> String {
        extension_of(&self.original_file_name)
    }

    /// Recorded folder, or [`DEFAULT_FOLDER`] when absent or blank.
    pub fn folder_or_default(&self) -> &str {
        self.folder
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FOLDER)
    }

    /// Filename component of the stored path.
    pub fn stored_file_name(&self) -> &str {
        self.storage_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.storage_path)
    }
}

/// Lower-cased extension of `name` including the leading dot.
pub fn extension_of(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(idx) if idx + 1 < base.len() => base[idx..].to_lowercase(),
        _ => String::new(),
    }
}

/// Data required to create a provisional asset row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    /// Filename as supplied by the uploader.
    pub original_file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Backend the bytes will be written to.
    pub storage_provider: String,
    /// Logical grouping.
    pub folder: String,
    /// Owning entity type.
    pub object_type: Option<String>,
    /// Owning entity id.
    pub object_id: Option<i64>,
    /// Uploading actor.
    pub uploaded_by: Option<i64>,
}

/// Editable display metadata. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetMetaUpdate {
    /// New caption.
    pub caption: Option<String>,
    /// New sort order.
    pub sort_order: Option<i32>,
    /// New status.
    pub status: Option<String>,
}

impl AssetMetaUpdate {
    /// Apply the present fields to an asset.
    pub fn apply_to(&self, asset: &mut Asset) {
        if let Some(caption) = &self.caption {
            asset.caption = Some(caption.clone());
        }
        if let Some(sort_order) = self.sort_order {
            asset.sort_order = sort_order;
        }
        if let Some(status) = &self.status {
            asset.status = Some(status.clone());
        }
    }
}
