//! PostgreSQL asset registry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;
use assethub_core::types::PageResponse;
use assethub_entity::asset::{
    Asset, AssetBrowseQuery, AssetCategory, AssetMetaUpdate, AssetStats, CategoryStat,
    ContentTypeFilter, DEFAULT_FOLDER, FolderStat, NewAsset, PENDING_PLACEHOLDER,
};

use crate::traits::AssetRegistry;

const CATEGORY_CASE: &str = "CASE \
    WHEN content_type ILIKE 'image/%' THEN 'Image' \
    WHEN content_type ILIKE 'video/%' THEN 'Video' \
    WHEN content_type ILIKE 'audio/%' THEN 'Audio' \
    ELSE 'Document' END";

/// Registry backed by the `assets` table.
#[derive(Debug, Clone)]
pub struct PgAssetRegistry {
    pool: PgPool,
}

impl PgAssetRegistry {
    /// Create a new registry over a pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A positional parameter for dynamically assembled browse queries.
#[derive(Debug, Clone)]
enum BrowseParam {
    Text(String),
    Time(DateTime<Utc>),
}

/// Escape `LIKE` wildcards in user supplied search text.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Build the `WHERE` clause and its parameters for a browse query.
fn browse_conditions(query: &AssetBrowseQuery) -> (String, Vec<BrowseParam>) {
    let mut conditions = vec![format!("storage_path <> '{PENDING_PLACEHOLDER}'")];
    let mut params = Vec::new();
    let mut param_idx = 1u32;

    if !query.include_deleted {
        conditions.push("is_deleted = FALSE".to_string());
    }

    match &query.content_type {
        Some(ContentTypeFilter::Category(category)) => match category.mime_prefix() {
            Some(prefix) => {
                conditions.push(format!("content_type ILIKE ${param_idx}"));
                params.push(BrowseParam::Text(format!("{prefix}%")));
                param_idx += 1;
            }
            None => {
                let excluded = AssetCategory::ALL
                    .iter()
                    .filter_map(|c| c.mime_prefix())
                    .map(|p| format!("content_type NOT ILIKE '{p}%'"))
                    .collect::<Vec<_>>();
                conditions.extend(excluded);
            }
        },
        Some(ContentTypeFilter::Exact(mime)) => {
            conditions.push(format!("LOWER(content_type) = ${param_idx}"));
            params.push(BrowseParam::Text(mime.to_lowercase()));
            param_idx += 1;
        }
        None => {}
    }

    if let Some(folder) = &query.folder {
        conditions.push(format!("folder = ${param_idx}"));
        params.push(BrowseParam::Text(folder.clone()));
        param_idx += 1;
    }
    if let Some(object_type) = &query.object_type {
        conditions.push(format!("object_type = ${param_idx}"));
        params.push(BrowseParam::Text(object_type.clone()));
        param_idx += 1;
    }
    if let Some(from) = query.date_from {
        conditions.push(format!("created_at >= ${param_idx}"));
        params.push(BrowseParam::Time(from));
        param_idx += 1;
    }
    if let Some(to) = query.date_to {
        conditions.push(format!("created_at <= ${param_idx}"));
        params.push(BrowseParam::Time(to));
        param_idx += 1;
    }
    if let Some(search) = query.search_pattern() {
        conditions.push(format!(
            "(original_file_name ILIKE ${param_idx} OR file_name ILIKE ${param_idx} OR caption ILIKE ${param_idx})"
        ));
        params.push(BrowseParam::Text(format!("%{}%", escape_like(&search))));
    }

    (format!("WHERE {}", conditions.join(" AND ")), params)
}

#[async_trait]
impl AssetRegistry for PgAssetRegistry {
    async fn create(&self, data: &NewAsset) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>(
            "INSERT INTO assets (file_name, original_file_name, content_type, file_size, \
             storage_provider, storage_path, folder, object_type, object_id, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $1, $6, $7, $8, $9) RETURNING *",
        )
        .bind(PENDING_PLACEHOLDER)
        .bind(&data.original_file_name)
        .bind(&data.content_type)
        .bind(data.file_size)
        .bind(&data.storage_provider)
        .bind(&data.folder)
        .bind(&data.object_type)
        .bind(data.object_id)
        .bind(data.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create asset", e))
    }

    async fn finalize(&self, file_id: i64, file_name: &str, storage_path: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE assets SET file_name = $2, storage_path = $3 \
             WHERE file_id = $1 AND storage_path = $4",
        )
        .bind(file_id)
        .bind(file_name)
        .bind(storage_path)
        .bind(PENDING_PLACEHOLDER)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to finalize asset", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn rollback_create(&self, file_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM assets WHERE file_id = $1 AND storage_path = $2")
            .bind(file_id)
            .bind(PENDING_PLACEHOLDER)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back asset", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, file_id: i64) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE file_id = $1")
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find asset", e))
    }

    async fn soft_delete(&self, file_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE assets SET is_deleted = TRUE, deleted_at = NOW() \
             WHERE file_id = $1 AND is_deleted = FALSE AND storage_path <> $2",
        )
        .bind(file_id)
        .bind(PENDING_PLACEHOLDER)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete asset", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn bulk_soft_delete(&self, file_ids: &[i64]) -> AppResult<u64> {
        if file_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE assets SET is_deleted = TRUE, deleted_at = NOW() \
             WHERE file_id = ANY($1) AND is_deleted = FALSE AND storage_path <> $2",
        )
        .bind(file_ids)
        .bind(PENDING_PLACEHOLDER)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to bulk delete assets", e))?;
        Ok(result.rows_affected())
    }

    async fn update_meta(&self, file_id: i64, update: &AssetMetaUpdate) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET caption = COALESCE($2, caption), \
             sort_order = COALESCE($3, sort_order), status = COALESCE($4, status) \
             WHERE file_id = $1 AND is_deleted = FALSE AND storage_path <> $5 RETURNING *",
        )
        .bind(file_id)
        .bind(&update.caption)
        .bind(update.sort_order)
        .bind(&update.status)
        .bind(PENDING_PLACEHOLDER)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update asset", e))
    }

    async fn browse(&self, query: &AssetBrowseQuery) -> AppResult<PageResponse<Asset>> {
        let (where_clause, params) = browse_conditions(query);
        let param_idx = params.len() + 1;

        let count_sql = format!("SELECT COUNT(*) FROM assets {where_clause}");
        let select_sql = format!(
            "SELECT * FROM assets {where_clause} ORDER BY created_at DESC, file_id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, Asset>(&select_sql);
        for param in params {
            match param {
                BrowseParam::Text(value) => {
                    count_query = count_query.bind(value.clone());
                    select_query = select_query.bind(value);
                }
                BrowseParam::Time(value) => {
                    count_query = count_query.bind(value);
                    select_query = select_query.bind(value);
                }
            }
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count assets", e)
        })?;

        let items = select_query
            .bind(query.page.limit() as i64)
            .bind(query.page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to browse assets", e))?;

        Ok(PageResponse::new(items, query.page, total.max(0) as u64))
    }

    async fn stats(&self) -> AppResult<AssetStats> {
        let (total_assets, active_assets, deleted_assets, total_size_bytes): (i64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT COUNT(*), \
                 COUNT(*) FILTER (WHERE is_deleted = FALSE), \
                 COUNT(*) FILTER (WHERE is_deleted = TRUE), \
                 COALESCE(SUM(file_size), 0)::BIGINT \
                 FROM assets WHERE storage_path <> $1",
            )
            .bind(PENDING_PLACEHOLDER)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to compute asset totals", e)
            })?;

        let by_category = sqlx::query_as::<_, CategoryStat>(&format!(
            "SELECT {CATEGORY_CASE} AS category, COUNT(*) AS file_count, \
             COALESCE(SUM(file_size), 0)::BIGINT AS total_size_bytes \
             FROM assets WHERE is_deleted = FALSE AND storage_path <> $1 \
             GROUP BY 1 ORDER BY file_count DESC, category"
        ))
        .bind(PENDING_PLACEHOLDER)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to compute category stats", e)
        })?;

        let by_folder = sqlx::query_as::<_, FolderStat>(
            "SELECT COALESCE(NULLIF(TRIM(folder), ''), $2) AS folder, COUNT(*) AS file_count, \
             COALESCE(SUM(file_size), 0)::BIGINT AS total_size_bytes \
             FROM assets WHERE is_deleted = FALSE AND storage_path <> $1 \
             GROUP BY 1 ORDER BY file_count DESC, folder",
        )
        .bind(PENDING_PLACEHOLDER)
        .bind(DEFAULT_FOLDER)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to compute folder stats", e)
        })?;

        Ok(AssetStats {
            total_assets,
            active_assets,
            deleted_assets,
            total_size_bytes,
            by_category,
            by_folder,
        })
    }

    async fn list_for_object(&self, object_type: &str, object_id: i64) -> AppResult<Vec<Asset>> {
        sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE object_type = $1 AND object_id = $2 \
             AND is_deleted = FALSE AND storage_path <> $3 \
             ORDER BY created_at DESC, file_id DESC",
        )
        .bind(object_type)
        .bind(object_id)
        .bind(PENDING_PLACEHOLDER)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list assets for object", e)
        })
    }

    async fn list_for_migration(&self) -> AppResult<Vec<Asset>> {
        sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE storage_path <> $1 ORDER BY file_id",
        )
        .bind(PENDING_PLACEHOLDER)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list migration candidates", e)
        })
    }

    async fn update_storage_location(
        &self,
        file_id: i64,
        file_name: &str,
        storage_path: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE assets SET file_name = $2, storage_path = $3 WHERE file_id = $1",
        )
        .bind(file_id)
        .bind(file_name)
        .bind(storage_path)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update asset location", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_pending(&self, older_than: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM assets WHERE storage_path = $1 AND created_at < $2")
            .bind(PENDING_PLACEHOLDER)
            .bind(older_than)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge pending assets", e)
            })?;
        Ok(result.rows_affected())
    }
}
