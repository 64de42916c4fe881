//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use assethub_cache::CacheManager;
use assethub_core::config::{AssetsConfig, ServerConfig};
use assethub_core::result::AppResult;
use assethub_database::{AssetRegistry, AuditLog, TypeRuleRepository};
use assethub_service::{
    AssetService, FileValidator, LegacyMigrator, MigrationGuard, TypeRuleStore, UploadPipeline,
};
use assethub_storage::StorageManager;

/// Persistence and infrastructure handles the services are built from.
///
/// The server passes PostgreSQL repositories; tests pass the in-memory ones.
#[derive(Debug, Clone)]
pub struct Backends {
    /// Asset metadata rows.
    pub registry: Arc<dyn AssetRegistry>,
    /// Upload type rules.
    pub type_rules: Arc<dyn TypeRuleRepository>,
    /// Administrative audit trail.
    pub audit: Arc<dyn AuditLog>,
    /// Cache manager (Redis or in-memory).
    pub cache: Arc<CacheManager>,
    /// Storage provider manager.
    pub storage: Arc<StorageManager>,
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// HTTP server configuration
    pub server: Arc<ServerConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Cache manager (Redis or in-memory)
    pub cache: Arc<CacheManager>,
    /// Storage provider manager
    pub storage: Arc<StorageManager>,

    // ── Services ─────────────────────────────────────────────
    /// Upload type rules with cache and fallback
    pub type_rules: Arc<TypeRuleStore>,
    /// Upload pipeline
    pub uploads: Arc<UploadPipeline>,
    /// Asset retrieval and administration
    pub assets: Arc<AssetService>,
    /// Legacy layout migrator
    pub migrator: Arc<LegacyMigrator>,
}

impl AppState {
    /// Wire the services over the given backends.
    pub fn build(server: ServerConfig, assets: &AssetsConfig, backends: Backends) -> AppResult<Self> {
        let type_rules = Arc::new(TypeRuleStore::new(
            backends.type_rules,
            backends.cache.clone(),
            Duration::from_secs(assets.type_rule_cache_ttl_seconds),
        ));

        let uploads = UploadPipeline::new(
            FileValidator::new(type_rules.clone()),
            backends.registry.clone(),
            backends.storage.clone(),
        );

        let asset_service = AssetService::new(
            backends.registry.clone(),
            backends.storage.clone(),
            backends.audit.clone(),
        );

        let guard = MigrationGuard::new(
            backends.cache.clone(),
            Duration::from_secs(assets.migration_lock_ttl_seconds),
        );
        let migrator = LegacyMigrator::new(
            backends.registry,
            backends.storage.clone(),
            backends.audit,
            guard,
            assets.migration_backup_dir.clone(),
        )?;

        Ok(Self {
            server: Arc::new(server),
            cache: backends.cache,
            storage: backends.storage,
            type_rules,
            uploads: Arc::new(uploads),
            assets: Arc::new(asset_service),
            migrator: Arc::new(migrator),
        })
    }
}
