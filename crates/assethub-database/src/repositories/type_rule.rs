//! PostgreSQL type-rule repository.

use async_trait::async_trait;
use sqlx::PgPool;

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;
use assethub_entity::type_rule::{TypeRule, TypeRuleInput};

use crate::traits::TypeRuleRepository;

/// Repository backed by the `asset_file_types` table.
#[derive(Debug, Clone)]
pub struct PgTypeRuleRepository {
    pool: PgPool,
}

impl PgTypeRuleRepository {
    /// Create a new repository over a pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map insert/update failures, surfacing duplicate MIME types as conflicts.
fn write_error(e: sqlx::Error, action: &str) -> AppError {
    let duplicate = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if duplicate {
        return AppError::with_source(
            ErrorKind::Conflict,
            "A rule for this MIME type already exists",
            e,
        );
    }
    AppError::with_source(ErrorKind::Database, format!("Failed to {action} type rule"), e)
}

#[async_trait]
impl TypeRuleRepository for PgTypeRuleRepository {
    async fn list_all(&self) -> AppResult<Vec<TypeRule>> {
        sqlx::query_as::<_, TypeRule>(
            "SELECT * FROM asset_file_types ORDER BY category, display_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list type rules", e))
    }

    async fn list_enabled(&self) -> AppResult<Vec<TypeRule>> {
        sqlx::query_as::<_, TypeRule>(
            "SELECT * FROM asset_file_types WHERE is_enabled = TRUE ORDER BY category, display_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list enabled type rules", e)
        })
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<TypeRule>> {
        sqlx::query_as::<_, TypeRule>("SELECT * FROM asset_file_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find type rule", e))
    }

    async fn list_by_category(&self, category: &str) -> AppResult<Vec<TypeRule>> {
        sqlx::query_as::<_, TypeRule>(
            "SELECT * FROM asset_file_types WHERE LOWER(category) = LOWER($1) ORDER BY display_name",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list type rules by category", e)
        })
    }

    async fn create(&self, input: &TypeRuleInput) -> AppResult<TypeRule> {
        sqlx::query_as::<_, TypeRule>(
            "INSERT INTO asset_file_types (mime_type, extensions, category, max_size_mb, is_enabled, display_name) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&input.mime_type)
        .bind(&input.extensions)
        .bind(&input.category)
        .bind(input.max_size_mb)
        .bind(input.is_enabled)
        .bind(&input.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "create"))
    }

    async fn update(&self, id: i64, input: &TypeRuleInput) -> AppResult<Option<TypeRule>> {
        sqlx::query_as::<_, TypeRule>(
            "UPDATE asset_file_types SET mime_type = $2, extensions = $3, category = $4, \
             max_size_mb = $5, is_enabled = $6, display_name = $7, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&input.mime_type)
        .bind(&input.extensions)
        .bind(&input.category)
        .bind(input.max_size_mb)
        .bind(input.is_enabled)
        .bind(&input.display_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "update"))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM asset_file_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete type rule", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle(&self, id: i64) -> AppResult<Option<TypeRule>> {
        sqlx::query_as::<_, TypeRule>(
            "UPDATE asset_file_types SET is_enabled = NOT is_enabled, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to toggle type rule", e))
    }
}
