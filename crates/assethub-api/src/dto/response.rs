//! Response DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use assethub_entity::asset::{Asset, AssetCategory};
use assethub_service::asset::asset_url;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Asset metadata as presented to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetResponse {
    /// Asset id.
    pub file_id: i64,
    /// Stored filename.
    pub file_name: String,
    /// Uploaded filename.
    pub original_file_name: String,
    /// MIME type.
    pub content_type: String,
    /// Derived category.
    pub category: AssetCategory,
    /// Size in bytes.
    pub file_size: i64,
    /// Backend holding the bytes.
    pub storage_provider: String,
    /// Logical grouping.
    pub folder: Option<String>,
    /// Owning entity type.
    pub object_type: Option<String>,
    /// Owning entity id.
    pub object_id: Option<i64>,
    /// Uploading actor.
    pub uploaded_by: Option<i64>,
    /// Display status.
    pub status: Option<String>,
    /// Display ordering.
    pub sort_order: i32,
    /// Caption.
    pub caption: Option<String>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Soft-delete time.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Retrieval URL.
    pub url: String,
    /// Thumbnail URL (images only).
    pub thumbnail_url: Option<String>,
}

impl From<Asset> for AssetResponse {
    fn from(asset: Asset) -> Self {
        let category = asset.category();
        let url = asset_url(asset.file_id);
        let thumbnail_url = (category == AssetCategory::Image).then(|| url.clone());
        Self {
            file_id: asset.file_id,
            file_name: asset.file_name,
            original_file_name: asset.original_file_name,
            content_type: asset.content_type,
            category,
            file_size: asset.file_size,
            storage_provider: asset.storage_provider,
            folder: asset.folder,
            object_type: asset.object_type,
            object_id: asset.object_id,
            uploaded_by: asset.uploaded_by,
            status: asset.status,
            sort_order: asset.sort_order,
            caption: asset.caption,
            is_deleted: asset.is_deleted,
            deleted_at: asset.deleted_at,
            created_at: asset.created_at,
            url,
            thumbnail_url,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Count value.
    pub count: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: `ok` or `degraded`.
    pub status: String,
    /// Version.
    pub version: String,
    /// Cache status.
    pub cache: String,
    /// Per-provider storage reachability.
    pub storage: BTreeMap<String, bool>,
}
