//! CLI command definitions and dispatch.

pub mod assets;
pub mod migrate;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use assethub_cache::CacheManager;
use assethub_core::config::AppConfig;
use assethub_core::error::AppError;
use assethub_database::DatabasePool;
use assethub_database::repositories::{PgAssetRegistry, PgAuditLog, PgTypeRuleRepository};
use assethub_service::{AssetService, LegacyMigrator, MigrationGuard, TypeRuleStore};
use assethub_storage::StorageManager;

use crate::output::OutputFormat;

/// AssetHub asset storage administration
#[derive(Debug, Parser)]
#[command(name = "assethub", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (loads `config/{env}.toml` over the defaults)
    #[arg(short, long, env = "ASSETHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database schema migrations
    Migrate(migrate::MigrateArgs),
    /// Asset administration and legacy layout migration
    Assets(assets::AssetsArgs),
    /// Upload type rules
    Types(types::TypesArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config, self.format).await,
            Commands::Assets(args) => assets::execute(args, &config, self.format).await,
            Commands::Types(args) => types::execute(args, &config, self.format).await,
        }
    }
}

/// Connections and services shared by the commands.
pub struct Context {
    /// Database pool.
    pub db: DatabasePool,
    /// Asset administration.
    pub assets: AssetService,
    /// Legacy layout migrator.
    pub migrator: LegacyMigrator,
    /// Type rules.
    pub type_rules: TypeRuleStore,
}

impl Context {
    /// Connect to every backend named in the configuration.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let db = DatabasePool::connect(&config.database).await?;
        let cache = Arc::new(CacheManager::new(&config.cache).await?);
        let storage = Arc::new(StorageManager::from_config(&config.storage).await?);

        let registry = Arc::new(PgAssetRegistry::new(db.pool().clone()));
        let audit = Arc::new(PgAuditLog::new(db.pool().clone()));
        let rules = Arc::new(PgTypeRuleRepository::new(db.pool().clone()));

        let guard = MigrationGuard::new(
            cache.clone(),
            Duration::from_secs(config.assets.migration_lock_ttl_seconds),
        );
        let migrator = LegacyMigrator::new(
            registry.clone(),
            storage.clone(),
            audit.clone(),
            guard,
            config.assets.migration_backup_dir.clone(),
        )?;

        Ok(Self {
            assets: AssetService::new(registry, storage, audit),
            migrator,
            type_rules: TypeRuleStore::new(
                rules,
                cache,
                Duration::from_secs(config.assets.type_rule_cache_ttl_seconds),
            ),
            db,
        })
    }
}

/// Ask for confirmation unless `assume_yes` is set.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool, AppError> {
    if assume_yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
