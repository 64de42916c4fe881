//! Upload pipeline: validate, provisionally register, write, finalize.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::traits::storage::StorageProvider;
use assethub_database::AssetRegistry;
use assethub_entity::asset::{NewAsset, extension_of};
use assethub_storage::{StorageManager, layout};

use crate::type_rule::FileValidator;

/// A file presented for upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// File content.
    pub data: Bytes,
    /// Filename as supplied by the client.
    pub original_file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Logical folder, e.g. `events/42/photos`.
    pub folder: String,
    /// Owning object type.
    pub object_type: Option<String>,
    /// Owning object id.
    pub object_id: Option<i64>,
    /// Uploading actor.
    pub uploaded_by: Option<i64>,
}

/// Result of an upload attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Whether the asset was stored and registered.
    pub success: bool,
    /// Assigned identity on success.
    pub file_id: Option<i64>,
    /// Canonical retrieval URL on success.
    pub url: Option<String>,
    /// Rejection or storage failure message.
    pub error: Option<String>,
    /// Size in bytes.
    pub file_size: i64,
    /// Declared MIME type.
    pub content_type: String,
    /// Client filename.
    pub original_file_name: String,
}

impl UploadOutcome {
    fn failed(request: &UploadRequest, message: impl Into<String>) -> Self {
        Self {
            success: false,
            file_id: None,
            url: None,
            error: Some(message.into()),
            file_size: request.data.len() as i64,
            content_type: request.content_type.clone(),
            original_file_name: request.original_file_name.clone(),
        }
    }

    fn stored(request: &UploadRequest, file_id: i64) -> Self {
        Self {
            success: true,
            file_id: Some(file_id),
            url: Some(asset_url(file_id)),
            error: None,
            file_size: request.data.len() as i64,
            content_type: request.content_type.clone(),
            original_file_name: request.original_file_name.clone(),
        }
    }
}

/// Canonical retrieval URL for an asset.
pub fn asset_url(file_id: i64) -> String {
    format!("/asset/{file_id}")
}

/// Turns an uploaded byte buffer into a registered, identity-addressed asset.
///
/// The registry row is created first (allocating `file_id`), the bytes are
/// written under a path derived from that id, and the row is finalized.
/// Any failure after the row exists removes it again.
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    validator: FileValidator,
    registry: Arc<dyn AssetRegistry>,
    storage: Arc<StorageManager>,
}

impl UploadPipeline {
    /// Creates a new upload pipeline.
    pub fn new(
        validator: FileValidator,
        registry: Arc<dyn AssetRegistry>,
        storage: Arc<StorageManager>,
    ) -> Self {
        Self {
            validator,
            registry,
            storage,
        }
    }

    /// Run an upload.
    ///
    /// Rejections and write failures come back as an unsuccessful
    /// [`UploadOutcome`] and leave no row behind. `Err` means the registry or
    /// the storage configuration itself is broken.
    pub async fn upload(&self, request: UploadRequest) -> AppResult<UploadOutcome> {
        let extension = extension_of(&request.original_file_name);
        let size = request.data.len() as i64;

        if let Err(e) = self
            .validator
            .validate(&request.content_type, &extension, size)
            .await
        {
            info!(
                file_name = %request.original_file_name,
                content_type = %request.content_type,
                size,
                reason = %e.message,
                "Upload rejected"
            );
            return Ok(UploadOutcome::failed(&request, e.message));
        }

        let folder = match layout::normalize_folder(&request.folder) {
            Ok(folder) => folder,
            Err(e) => return Ok(UploadOutcome::failed(&request, e.message)),
        };

        let (provider_name, provider) = self.storage.get_default().await?;

        let asset = self
            .registry
            .create(&NewAsset {
                original_file_name: request.original_file_name.clone(),
                content_type: request.content_type.clone(),
                file_size: size,
                storage_provider: provider_name,
                folder: folder.clone(),
                object_type: request.object_type.clone(),
                object_id: request.object_id,
                uploaded_by: request.uploaded_by,
            })
            .await?;
        let file_id = asset.file_id;

        let file_name = layout::asset_file_name(file_id, &extension);
        let storage_path = layout::asset_path(&folder, asset.created_at, file_id, &extension);

        if let Err(e) = provider.write(&storage_path, request.data.clone()).await {
            warn!(file_id, path = %storage_path, error = %e, "Blob write failed, rolling back");
            self.rollback(file_id).await;
            return Ok(UploadOutcome::failed(&request, e.message));
        }

        match self.registry.finalize(file_id, &file_name, &storage_path).await {
            Ok(true) => {}
            Ok(false) => {
                self.discard(provider.as_ref(), file_id, &storage_path).await;
                return Err(AppError::internal(format!(
                    "Provisional asset {file_id} vanished before it could be finalized"
                )));
            }
            Err(e) => {
                error!(file_id, error = %e, "Finalize failed after write");
                self.discard(provider.as_ref(), file_id, &storage_path).await;
                return Err(e);
            }
        }

        info!(
            file_id,
            path = %storage_path,
            size,
            content_type = %request.content_type,
            "Upload completed"
        );
        Ok(UploadOutcome::stored(&request, file_id))
    }

    async fn rollback(&self, file_id: i64) {
        if let Err(e) = self.registry.rollback_create(file_id).await {
            error!(file_id, error = %e, "Failed to roll back provisional asset row");
        }
    }

    async fn discard(&self, provider: &dyn StorageProvider, file_id: i64, storage_path: &str) {
        if let Err(e) = provider.delete(storage_path).await {
            error!(file_id, path = %storage_path, error = %e, "Failed to remove orphaned blob");
        }
        self.rollback(file_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use assethub_cache::CacheManager;
    use assethub_core::traits::storage::{ByteStream, StorageObjectMeta};
    use assethub_database::memory::{MemoryAssetRegistry, MemoryTypeRuleRepository};
    use assethub_storage::providers::LocalStorageProvider;

    use crate::type_rule::TypeRuleStore;

    #[derive(Debug)]
    struct BrokenDisk;

    #[async_trait]
    impl StorageProvider for BrokenDisk {
        fn provider_type(&self) -> &str {
            "broken"
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(false)
        }
        async fn read(&self, _path: &str) -> AppResult<ByteStream> {
            Err(AppError::storage("disk offline"))
        }
        async fn read_bytes(&self, _path: &str) -> AppResult<Bytes> {
            Err(AppError::storage("disk offline"))
        }
        async fn write(&self, _path: &str, _data: Bytes) -> AppResult<()> {
            Err(AppError::storage("disk offline"))
        }
        async fn delete(&self, _path: &str) -> AppResult<()> {
            Ok(())
        }
        async fn copy(&self, _from: &str, _to: &str) -> AppResult<()> {
            Err(AppError::storage("disk offline"))
        }
        async fn rename(&self, _from: &str, _to: &str) -> AppResult<()> {
            Err(AppError::storage("disk offline"))
        }
        async fn exists(&self, _path: &str) -> AppResult<bool> {
            Ok(false)
        }
        async fn metadata(&self, path: &str) -> AppResult<StorageObjectMeta> {
            Err(AppError::not_found(path.to_string()))
        }
    }

    fn validator() -> FileValidator {
        let store = TypeRuleStore::new(
            Arc::new(MemoryTypeRuleRepository::new()),
            Arc::new(CacheManager::in_memory()),
            Duration::from_secs(600),
        );
        FileValidator::new(Arc::new(store))
    }

    async fn local_pipeline(
        dir: &tempfile::TempDir,
    ) -> (UploadPipeline, Arc<MemoryAssetRegistry>, Arc<dyn StorageProvider>) {
        let provider: Arc<dyn StorageProvider> = Arc::new(
            LocalStorageProvider::new(dir.path().to_str().unwrap())
                .await
                .unwrap(),
        );
        let storage = Arc::new(StorageManager::new());
        storage.register("local", provider.clone(), true).await;
        let registry = Arc::new(MemoryAssetRegistry::new());
        (
            UploadPipeline::new(validator(), registry.clone(), storage),
            registry,
            provider,
        )
    }

    fn request(name: &str, content_type: &str, size: usize) -> UploadRequest {
        UploadRequest {
            data: Bytes::from(vec![7u8; size]),
            original_file_name: name.to_string(),
            content_type: content_type.to_string(),
            folder: "events/42/photos".to_string(),
            object_type: Some("event".to_string()),
            object_id: Some(42),
            uploaded_by: Some(5),
        }
    }

    #[tokio::test]
    async fn test_successful_upload_is_identity_named() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, registry, provider) = local_pipeline(&dir).await;

        let outcome = pipeline.upload(request("Team Photo.JPG", "image/jpeg", 64)).await.unwrap();
        assert!(outcome.success);
        let file_id = outcome.file_id.unwrap();
        assert_eq!(outcome.url.as_deref(), Some(format!("/asset/{file_id}").as_str()));
        assert_eq!(outcome.file_size, 64);

        let asset = registry.find_by_id(file_id).await.unwrap().unwrap();
        assert_eq!(asset.file_name, format!("{file_id}.jpg"));
        assert!(asset.storage_path.ends_with(&format!("/{file_id}.jpg")));
        assert!(asset.storage_path.starts_with("events/42/photos/"));
        assert_eq!(asset.storage_provider, "local");
        assert!(provider.exists(&asset.storage_path).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejected_upload_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, registry, _provider) = local_pipeline(&dir).await;

        let outcome = pipeline
            .upload(request("setup.exe", "application/x-msdownload", 10))
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("not allowed"));

        let too_big = pipeline
            .upload(request("clip.gif", "image/gif", 10 * 1_048_576 + 1))
            .await
            .unwrap();
        assert!(!too_big.success);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_the_row() {
        let storage = Arc::new(StorageManager::new());
        storage.register("local", Arc::new(BrokenDisk), true).await;
        let registry = Arc::new(MemoryAssetRegistry::new());
        let pipeline = UploadPipeline::new(validator(), registry.clone(), storage);

        let outcome = pipeline.upload(request("a.png", "image/png", 8)).await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.file_id.is_none());
        assert!(outcome.error.unwrap().contains("disk offline"));
        assert!(registry.is_empty().await);
        assert!(registry.find_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_uploads_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _registry, _provider) = local_pipeline(&dir).await;

        let uploads = (0..8).map(|_| pipeline.upload(request("p.png", "image/png", 4)));
        let outcomes = futures::future::join_all(uploads).await;
        let mut ids: Vec<i64> = outcomes
            .into_iter()
            .map(|o| o.unwrap().file_id.unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[tokio::test]
    async fn test_rejects_folder_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, registry, _provider) = local_pipeline(&dir).await;
        let mut req = request("a.png", "image/png", 4);
        req.folder = "../../etc".to_string();
        let outcome = pipeline.upload(req).await.unwrap();
        assert!(!outcome.success);
        assert!(registry.is_empty().await);
    }
}
