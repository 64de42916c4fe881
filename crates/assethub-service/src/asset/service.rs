//! Asset retrieval and administration.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::traits::storage::ByteStream;
use assethub_core::types::PageResponse;
use assethub_database::{AssetRegistry, AuditLog};
use assethub_entity::asset::{Asset, AssetBrowseQuery, AssetCategory, AssetMetaUpdate, AssetStats};
use assethub_storage::StorageManager;

use crate::audit;

/// How an asset's bytes are delivered.
pub enum AssetContent {
    /// The bytes live on a remote backend; send the client there.
    Redirect(String),
    /// The bytes are streamed through this service.
    Stream {
        /// File content.
        stream: ByteStream,
        /// MIME type recorded at upload.
        content_type: String,
        /// Filename presented to the client.
        file_name: String,
        /// Size on disk.
        size: u64,
        /// Serve inline (images) rather than as an attachment.
        inline: bool,
    },
}

impl std::fmt::Debug for AssetContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redirect(url) => f.debug_tuple("Redirect").field(url).finish(),
            Self::Stream {
                content_type,
                file_name,
                size,
                inline,
                ..
            } => f
                .debug_struct("Stream")
                .field("content_type", content_type)
                .field("file_name", file_name)
                .field("size", size)
                .field("inline", inline)
                .finish_non_exhaustive(),
        }
    }
}

/// Read access and administrative operations over registered assets.
#[derive(Debug, Clone)]
pub struct AssetService {
    registry: Arc<dyn AssetRegistry>,
    storage: Arc<StorageManager>,
    audit: Arc<dyn AuditLog>,
}

impl AssetService {
    /// Creates a new asset service.
    pub fn new(
        registry: Arc<dyn AssetRegistry>,
        storage: Arc<StorageManager>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            registry,
            storage,
            audit,
        }
    }

    /// Metadata for an asset, soft-deleted ones included. Provisional rows
    /// are never visible.
    pub async fn get_metadata(&self, file_id: i64) -> AppResult<Option<Asset>> {
        Ok(self
            .registry
            .find_by_id(file_id)
            .await?
            .filter(|a| !a.is_pending()))
    }

    /// Metadata for an active asset, or `NotFound`.
    pub async fn get_active(&self, file_id: i64) -> AppResult<Asset> {
        self.get_metadata(file_id)
            .await?
            .filter(|a| !a.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Asset {file_id} not found")))
    }

    /// The bytes of an active asset, as a redirect or a stream depending on
    /// the backend recorded on the asset.
    pub async fn get_content(&self, file_id: i64) -> AppResult<AssetContent> {
        let asset = self.get_active(file_id).await?;
        if is_absolute_url(&asset.storage_path) {
            return Ok(AssetContent::Redirect(asset.storage_path));
        }

        let provider = self.storage.get(&asset.storage_provider).await?;
        if let Some(url) = provider.public_url(&asset.storage_path) {
            return Ok(AssetContent::Redirect(url));
        }

        let meta = provider.metadata(&asset.storage_path).await.map_err(|e| {
            if e.is_not_found() {
                warn!(file_id, path = %asset.storage_path, "Asset bytes missing from storage");
                AppError::not_found(format!("File for asset {file_id} not found"))
            } else {
                e
            }
        })?;
        let stream = provider.read(&asset.storage_path).await?;

        Ok(AssetContent::Stream {
            stream,
            inline: asset.category() == AssetCategory::Image,
            content_type: asset.content_type,
            file_name: asset.original_file_name,
            size: meta.size_bytes,
        })
    }

    /// Filtered, paginated listing.
    pub async fn browse(&self, query: &AssetBrowseQuery) -> AppResult<PageResponse<Asset>> {
        self.registry.browse(query).await
    }

    /// Registry-wide aggregates.
    pub async fn stats(&self) -> AppResult<AssetStats> {
        self.registry.stats().await
    }

    /// Active assets attached to an object, newest first.
    pub async fn list_for_object(&self, object_type: &str, object_id: i64) -> AppResult<Vec<Asset>> {
        self.registry.list_for_object(object_type, object_id).await
    }

    /// Update caption, sort order or status of an active asset.
    pub async fn update_meta(&self, file_id: i64, update: &AssetMetaUpdate) -> AppResult<Option<Asset>> {
        let updated = self.registry.update_meta(file_id, update).await?;
        if updated.is_some() {
            info!(file_id, "Asset metadata updated");
        }
        Ok(updated)
    }

    /// Soft-delete an asset. `false` if absent or already deleted.
    pub async fn delete(&self, file_id: i64) -> AppResult<bool> {
        let deleted = self.registry.soft_delete(file_id).await?;
        if deleted {
            info!(file_id, "Asset soft-deleted");
        }
        Ok(deleted)
    }

    /// Soft-delete several assets, returning how many changed state.
    pub async fn bulk_delete(&self, file_ids: &[i64], actor_id: Option<i64>) -> AppResult<u64> {
        if file_ids.is_empty() {
            return Err(AppError::validation("No file IDs provided"));
        }
        let mut ids = file_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let count = self.registry.bulk_soft_delete(&ids).await?;
        info!(requested = ids.len(), deleted = count, "Bulk soft-delete completed");

        audit::record(
            self.audit.as_ref(),
            actor_id,
            "asset.bulk_delete",
            None,
            serde_json::json!({ "file_ids": ids, "deleted": count }),
        )
        .await;
        Ok(count)
    }

    /// Remove provisional rows older than `retention`.
    pub async fn purge_pending(&self, retention: Duration) -> AppResult<u64> {
        let cutoff = Utc::now() - retention;
        let purged = self.registry.purge_pending(cutoff).await?;
        if purged > 0 {
            warn!(purged, cutoff = %cutoff, "Purged abandoned provisional asset rows");
        }
        Ok(purged)
    }
}

fn is_absolute_url(path: &str) -> bool {
    let lowered = path.trim_start().to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::StreamExt;

    use assethub_core::traits::storage::StorageProvider;
    use assethub_database::memory::{MemoryAssetRegistry, MemoryAuditLog};
    use assethub_entity::asset::NewAsset;
    use assethub_storage::providers::LocalStorageProvider;

    struct Fixture {
        _dir: tempfile::TempDir,
        service: AssetService,
        registry: Arc<MemoryAssetRegistry>,
        audit: Arc<MemoryAuditLog>,
        disk: Arc<dyn StorageProvider>,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let disk: Arc<dyn StorageProvider> = Arc::new(
            LocalStorageProvider::new(dir.path().to_str().unwrap())
                .await
                .unwrap(),
        );
        let storage = Arc::new(StorageManager::new());
        storage.register("local", disk.clone(), true).await;
        let registry = Arc::new(MemoryAssetRegistry::new());
        let audit = Arc::new(MemoryAuditLog::new());
        Fixture {
            _dir: dir,
            service: AssetService::new(registry.clone(), storage, audit.clone()),
            registry,
            audit,
            disk,
        }
    }

    async fn stored(f: &Fixture, name: &str, content_type: &str, bytes: &'static [u8]) -> Asset {
        let asset = f
            .registry
            .create(&NewAsset {
                original_file_name: name.to_string(),
                content_type: content_type.to_string(),
                file_size: bytes.len() as i64,
                storage_provider: "Local".to_string(),
                folder: "clubs".to_string(),
                object_type: Some("club".to_string()),
                object_id: Some(3),
                uploaded_by: None,
            })
            .await
            .unwrap();
        let path = format!("clubs/2024-03/{}.bin", asset.file_id);
        f.disk.write(&path, Bytes::from_static(bytes)).await.unwrap();
        f.registry
            .finalize(asset.file_id, &format!("{}.bin", asset.file_id), &path)
            .await
            .unwrap();
        f.registry.find_by_id(asset.file_id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_streams_local_content() {
        let f = fixture().await;
        let asset = stored(&f, "logo.png", "image/png", b"png-bytes").await;

        let content = f.service.get_content(asset.file_id).await.unwrap();
        let AssetContent::Stream {
            mut stream,
            inline,
            file_name,
            size,
            ..
        } = content
        else {
            panic!("expected a stream");
        };
        assert!(inline);
        assert_eq!(file_name, "logo.png");
        assert_eq!(size, 9);
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"png-bytes");
    }

    #[tokio::test]
    async fn test_missing_bytes_and_deleted_assets_are_not_found() {
        let f = fixture().await;
        let asset = stored(&f, "doc.pdf", "application/pdf", b"%PDF").await;

        f.disk.delete(&asset.storage_path).await.unwrap();
        assert!(f.service.get_content(asset.file_id).await.unwrap_err().is_not_found());

        assert!(f.service.delete(asset.file_id).await.unwrap());
        assert!(!f.service.delete(asset.file_id).await.unwrap());
        assert!(f.service.get_active(asset.file_id).await.unwrap_err().is_not_found());

        let meta = f.service.get_metadata(asset.file_id).await.unwrap().unwrap();
        assert!(meta.is_deleted);
        assert!(f.service.list_for_object("club", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_absolute_storage_path_redirects() {
        let f = fixture().await;
        let mut asset = stored(&f, "v.mp4", "video/mp4", b"x").await;
        asset.storage_path = "https://cdn.example.com/v.mp4".to_string();
        f.registry.insert(asset.clone()).await;

        match f.service.get_content(asset.file_id).await.unwrap() {
            AssetContent::Redirect(url) => assert_eq!(url, "https://cdn.example.com/v.mp4"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_absolute_url_redirects_without_registered_provider() {
        let f = fixture().await;
        let mut asset = stored(&f, "v.mp4", "video/mp4", b"x").await;
        asset.storage_provider = "S3".to_string();
        asset.storage_path = "https://bucket.s3.amazonaws.com/clubs/v.mp4".to_string();
        f.registry.insert(asset.clone()).await;

        match f.service.get_content(asset.file_id).await.unwrap() {
            AssetContent::Redirect(url) => {
                assert_eq!(url, "https://bucket.s3.amazonaws.com/clubs/v.mp4")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bulk_delete_counts_and_audits() {
        let f = fixture().await;
        let a = stored(&f, "a.png", "image/png", b"a").await;
        let b = stored(&f, "b.png", "image/png", b"b").await;
        let c = stored(&f, "c.png", "image/png", b"c").await;
        assert!(f.service.delete(b.file_id).await.unwrap());

        let count = f
            .service
            .bulk_delete(&[a.file_id, b.file_id, c.file_id, a.file_id], Some(9))
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert!(!f.service.delete(a.file_id).await.unwrap());
        assert!(!f.service.delete(c.file_id).await.unwrap());

        let entries = f.audit.recent(Some("asset.bulk_delete"), 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor_id, Some(9));

        let err = f.service.bulk_delete(&[], None).await.unwrap_err();
        assert_eq!(err.message, "No file IDs provided");
    }

    #[tokio::test]
    async fn test_provisional_rows_are_invisible_and_purgeable() {
        let f = fixture().await;
        let pending = f
            .registry
            .create(&NewAsset {
                original_file_name: "half.png".to_string(),
                content_type: "image/png".to_string(),
                file_size: 1,
                storage_provider: "local".to_string(),
                folder: "misc".to_string(),
                object_type: None,
                object_id: None,
                uploaded_by: None,
            })
            .await
            .unwrap();
        assert!(f.service.get_metadata(pending.file_id).await.unwrap().is_none());

        assert_eq!(f.service.purge_pending(Duration::hours(1)).await.unwrap(), 0);
        assert_eq!(f.service.purge_pending(Duration::seconds(-1)).await.unwrap(), 1);
        assert!(f.registry.is_empty().await);
    }
}
