//! In-memory asset registry.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use assethub_core::result::AppResult;
use assethub_core::types::PageResponse;
use assethub_entity::asset::{
    Asset, AssetBrowseQuery, AssetMetaUpdate, AssetStats, CategoryStat, FolderStat, NewAsset,
    PENDING_PLACEHOLDER,
};

use crate::traits::AssetRegistry;

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    rows: BTreeMap<i64, Asset>,
}

/// Registry holding rows in a map guarded by an async lock.
#[derive(Debug, Default)]
pub struct MemoryAssetRegistry {
    state: RwLock<State>,
}

impl MemoryAssetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed row as-is, e.g. a legacy asset. Advances the
    /// id sequence past the inserted id.
    pub async fn insert(&self, asset: Asset) {
        let mut state = self.state.write().await;
        state.next_id = state.next_id.max(asset.file_id);
        state.rows.insert(asset.file_id, asset);
    }

    /// Number of rows, provisional ones included.
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    /// Whether the registry holds no rows at all.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn newest_first(a: &Asset, b: &Asset) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.file_id.cmp(&a.file_id))
}

#[async_trait]
impl AssetRegistry for MemoryAssetRegistry {
    async fn create(&self, data: &NewAsset) -> AppResult<Asset> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let asset = Asset {
            file_id: state.next_id,
            file_name: PENDING_PLACEHOLDER.to_string(),
            original_file_name: data.original_file_name.clone(),
            content_type: data.content_type.clone(),
            file_size: data.file_size,
            storage_provider: data.storage_provider.clone(),
            storage_path: PENDING_PLACEHOLDER.to_string(),
            folder: Some(data.folder.clone()),
            object_type: data.object_type.clone(),
            object_id: data.object_id,
            uploaded_by: data.uploaded_by,
            status: None,
            sort_order: 0,
            caption: None,
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
        };
        state.rows.insert(asset.file_id, asset.clone());
        Ok(asset)
    }

    async fn finalize(&self, file_id: i64, file_name: &str, storage_path: &str) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&file_id) {
            Some(asset) if asset.is_pending() => {
                asset.file_name = file_name.to_string();
                asset.storage_path = storage_path.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn rollback_create(&self, file_id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.rows.get(&file_id).is_some_and(Asset::is_pending) {
            state.rows.remove(&file_id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn find_by_id(&self, file_id: i64) -> AppResult<Option<Asset>> {
        Ok(self.state.read().await.rows.get(&file_id).cloned())
    }

    async fn soft_delete(&self, file_id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&file_id) {
            Some(asset) if !asset.is_deleted && !asset.is_pending() => {
                asset.is_deleted = true;
                asset.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn bulk_soft_delete(&self, file_ids: &[i64]) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut count = 0;
        for id in file_ids {
            if let Some(asset) = state.rows.get_mut(id) {
                if !asset.is_deleted && !asset.is_pending() {
                    asset.is_deleted = true;
                    asset.deleted_at = Some(now);
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    async fn update_meta(&self, file_id: i64, update: &AssetMetaUpdate) -> AppResult<Option<Asset>> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&file_id) {
            Some(asset) if !asset.is_deleted && !asset.is_pending() => {
                update.apply_to(asset);
                Ok(Some(asset.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn browse(&self, query: &AssetBrowseQuery) -> AppResult<PageResponse<Asset>> {
        let state = self.state.read().await;
        let mut matched: Vec<&Asset> = state.rows.values().filter(|a| query.matches(a)).collect();
        matched.sort_by(|a, b| newest_first(a, b));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResponse::new(items, query.page, total))
    }

    async fn stats(&self) -> AppResult<AssetStats> {
        let state = self.state.read().await;
        let mut stats = AssetStats::default();
        let mut categories: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        let mut folders: BTreeMap<String, (i64, i64)> = BTreeMap::new();

        for asset in state.rows.values().filter(|a| !a.is_pending()) {
            stats.total_assets += 1;
            stats.total_size_bytes += asset.file_size;
            if asset.is_deleted {
                stats.deleted_assets += 1;
                continue;
            }
            stats.active_assets += 1;
            let entry = categories.entry(asset.category().to_string()).or_default();
            entry.0 += 1;
            entry.1 += asset.file_size;
            let entry = folders.entry(asset.folder_or_default().to_string()).or_default();
            entry.0 += 1;
            entry.1 += asset.file_size;
        }

        stats.by_category = categories
            .into_iter()
            .map(|(category, (file_count, total_size_bytes))| CategoryStat {
                category,
                file_count,
                total_size_bytes,
            })
            .collect();
        stats
            .by_category
            .sort_by(|a, b| b.file_count.cmp(&a.file_count).then_with(|| a.category.cmp(&b.category)));

        stats.by_folder = folders
            .into_iter()
            .map(|(folder, (file_count, total_size_bytes))| FolderStat {
                folder,
                file_count,
                total_size_bytes,
            })
            .collect();
        stats
            .by_folder
            .sort_by(|a, b| b.file_count.cmp(&a.file_count).then_with(|| a.folder.cmp(&b.folder)));

        Ok(stats)
    }

    async fn list_for_object(&self, object_type: &str, object_id: i64) -> AppResult<Vec<Asset>> {
        let state = self.state.read().await;
        let mut assets: Vec<Asset> = state
            .rows
            .values()
            .filter(|a| {
                !a.is_deleted
                    && !a.is_pending()
                    && a.object_type.as_deref() == Some(object_type)
                    && a.object_id == Some(object_id)
            })
            .cloned()
            .collect();
        assets.sort_by(newest_first);
        Ok(assets)
    }

    async fn list_for_migration(&self) -> AppResult<Vec<Asset>> {
        let state = self.state.read().await;
        Ok(state.rows.values().filter(|a| !a.is_pending()).cloned().collect())
    }

    async fn update_storage_location(
        &self,
        file_id: i64,
        file_name: &str,
        storage_path: &str,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&file_id) {
            Some(asset) => {
                asset.file_name = file_name.to_string();
                asset.storage_path = storage_path.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge_pending(&self, older_than: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.rows.len();
        state
            .rows
            .retain(|_, a| !(a.is_pending() && a.created_at < older_than));
        Ok((before - state.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assethub_core::types::PageRequest;
    use assethub_entity::asset::{AssetCategory, ContentTypeFilter};

    fn new_asset(name: &str, content_type: &str, folder: &str) -> NewAsset {
        NewAsset {
            original_file_name: name.to_string(),
            content_type: content_type.to_string(),
            file_size: 1024,
            storage_provider: "local".to_string(),
            folder: folder.to_string(),
            object_type: Some("event".to_string()),
            object_id: Some(42),
            uploaded_by: Some(7),
        }
    }

    async fn finalized(registry: &MemoryAssetRegistry, name: &str, content_type: &str) -> Asset {
        let asset = registry
            .create(&new_asset(name, content_type, "events/42/photos"))
            .await
            .unwrap();
        let file_name = format!("{}.bin", asset.file_id);
        registry
            .finalize(asset.file_id, &file_name, &format!("events/42/photos/2024-03/{file_name}"))
            .await
            .unwrap();
        registry.find_by_id(asset.file_id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_create_allocates_unique_ids_and_pending_placeholders() {
        let registry = MemoryAssetRegistry::new();
        let a = registry.create(&new_asset("a.jpg", "image/jpeg", "x")).await.unwrap();
        let b = registry.create(&new_asset("b.jpg", "image/jpeg", "x")).await.unwrap();
        assert_ne!(a.file_id, b.file_id);
        assert!(a.is_pending());
        assert_eq!(a.file_name, PENDING_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_rollback_only_removes_provisional_rows() {
        let registry = MemoryAssetRegistry::new();
        let pending = registry.create(&new_asset("a.jpg", "image/jpeg", "x")).await.unwrap();
        let done = finalized(&registry, "b.jpg", "image/jpeg").await;

        assert!(registry.rollback_create(pending.file_id).await.unwrap());
        assert!(registry.find_by_id(pending.file_id).await.unwrap().is_none());
        assert!(!registry.rollback_create(done.file_id).await.unwrap());
        assert!(registry.find_by_id(done.file_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_rollback() {
        let registry = MemoryAssetRegistry::new();
        let first = registry.create(&new_asset("a.jpg", "image/jpeg", "x")).await.unwrap();
        registry.rollback_create(first.file_id).await.unwrap();
        let second = registry.create(&new_asset("b.jpg", "image/jpeg", "x")).await.unwrap();
        assert!(second.file_id > first.file_id);
    }

    #[tokio::test]
    async fn test_soft_delete_is_idempotent() {
        let registry = MemoryAssetRegistry::new();
        let asset = finalized(&registry, "a.jpg", "image/jpeg").await;

        assert!(registry.soft_delete(asset.file_id).await.unwrap());
        assert!(!registry.soft_delete(asset.file_id).await.unwrap());
        assert!(!registry.soft_delete(9999).await.unwrap());

        let stored = registry.find_by_id(asset.file_id).await.unwrap().unwrap();
        assert!(stored.is_deleted);
        assert!(stored.deleted_at.is_some());

        let listed = registry.list_for_object("event", 42).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_soft_delete_counts_only_state_changes() {
        let registry = MemoryAssetRegistry::new();
        let a = finalized(&registry, "a.jpg", "image/jpeg").await;
        let b = finalized(&registry, "b.jpg", "image/jpeg").await;
        let c = finalized(&registry, "c.jpg", "image/jpeg").await;
        registry.soft_delete(b.file_id).await.unwrap();

        let count = registry
            .bulk_soft_delete(&[a.file_id, b.file_id, c.file_id])
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert!(!registry.soft_delete(a.file_id).await.unwrap());
        assert!(!registry.soft_delete(c.file_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_browse_filters_and_paginates() {
        let registry = MemoryAssetRegistry::new();
        for i in 0..5 {
            finalized(&registry, &format!("photo{i}.jpg"), "image/jpeg").await;
        }
        let pdf = finalized(&registry, "minutes.pdf", "application/pdf").await;
        registry.create(&new_asset("pending.jpg", "image/jpeg", "x")).await.unwrap();

        let page = registry
            .browse(&AssetBrowseQuery {
                page: PageRequest::new(1, 2),
                content_type: Some(ContentTypeFilter::Category(AssetCategory::Image)),
                ..AssetBrowseQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.items[0].file_id > page.items[1].file_id);

        let far = registry
            .browse(&AssetBrowseQuery {
                page: PageRequest::new(u64::MAX, 200),
                ..AssetBrowseQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(far.total_count, 6);
        assert!(far.items.is_empty());

        registry.soft_delete(pdf.file_id).await.unwrap();
        let docs = registry
            .browse(&AssetBrowseQuery {
                content_type: Some(ContentTypeFilter::Category(AssetCategory::Document)),
                ..AssetBrowseQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(docs.total_count, 0);

        let with_deleted = registry
            .browse(&AssetBrowseQuery {
                search: Some("MINUTES".to_string()),
                include_deleted: true,
                ..AssetBrowseQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(with_deleted.total_count, 1);
    }

    #[tokio::test]
    async fn test_update_meta_only_touches_supplied_fields() {
        let registry = MemoryAssetRegistry::new();
        let asset = finalized(&registry, "a.jpg", "image/jpeg").await;

        let updated = registry
            .update_meta(
                asset.file_id,
                &AssetMetaUpdate {
                    caption: Some("Opening night".to_string()),
                    ..AssetMetaUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.caption.as_deref(), Some("Opening night"));
        assert_eq!(updated.sort_order, 0);

        let updated = registry
            .update_meta(
                asset.file_id,
                &AssetMetaUpdate {
                    sort_order: Some(3),
                    status: Some("featured".to_string()),
                    ..AssetMetaUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.caption.as_deref(), Some("Opening night"));
        assert_eq!(updated.sort_order, 3);
        assert!(registry.update_meta(404, &AssetMetaUpdate::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_groups_active_assets() {
        let registry = MemoryAssetRegistry::new();
        finalized(&registry, "a.jpg", "image/jpeg").await;
        finalized(&registry, "b.png", "image/png").await;
        let doc = finalized(&registry, "c.pdf", "application/pdf").await;
        registry.soft_delete(doc.file_id).await.unwrap();

        let stats = registry.stats().await.unwrap();
        assert_eq!(stats.total_assets, 3);
        assert_eq!(stats.active_assets, 2);
        assert_eq!(stats.deleted_assets, 1);
        assert_eq!(stats.total_size_bytes, 3 * 1024);
        assert_eq!(stats.by_category.len(), 1);
        assert_eq!(stats.by_category[0].category, "Image");
        assert_eq!(stats.by_folder[0].file_count, 2);
    }

    #[tokio::test]
    async fn test_purge_pending_respects_cutoff() {
        let registry = MemoryAssetRegistry::new();
        registry.create(&new_asset("a.jpg", "image/jpeg", "x")).await.unwrap();
        finalized(&registry, "b.jpg", "image/jpeg").await;

        assert_eq!(registry.purge_pending(Utc::now() - chrono::Duration::hours(1)).await.unwrap(), 0);
        assert_eq!(registry.purge_pending(Utc::now() + chrono::Duration::seconds(1)).await.unwrap(), 1);
        assert_eq!(registry.len().await, 1);
    }
}
