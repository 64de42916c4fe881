//! Schema migration runner.
//!
//! Applies the ordered SQL scripts under `migrations/` and reports which
//! of them have been recorded in `_sqlx_migrations`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use assethub_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applied state of one schema script.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaMigration {
    /// Script version (timestamp prefix).
    pub version: i64,
    /// Script description derived from its filename.
    pub description: String,
    /// When the script was applied, if it has been.
    pub installed_on: Option<DateTime<Utc>>,
    /// Whether the recorded run succeeded.
    pub success: Option<bool>,
    /// Recorded execution time in milliseconds.
    pub duration_ms: Option<i64>,
}

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations...");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// List every known script together with its recorded history.
pub async fn migration_status(pool: &PgPool) -> Result<Vec<SchemaMigration>, AppError> {
    let table_exists: bool =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to inspect migration table", e)
            })?;

    let applied: Vec<(i64, DateTime<Utc>, bool, i64)> = if table_exists {
        sqlx::query_as(
            "SELECT version, installed_on, success, execution_time FROM _sqlx_migrations ORDER BY version",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to read migration history", e)
        })?
    } else {
        Vec::new()
    };

    Ok(MIGRATOR
        .iter()
        .map(|m| {
            let record = applied.iter().find(|(v, ..)| *v == m.version);
            SchemaMigration {
                version: m.version,
                description: m.description.to_string(),
                installed_on: record.map(|(_, at, ..)| *at),
                success: record.map(|(_, _, ok, _)| *ok),
                duration_ms: record.map(|(.., nanos)| nanos / 1_000_000),
            }
        })
        .collect())
}
