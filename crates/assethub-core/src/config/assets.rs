//! Asset lifecycle configuration: type-rule caching and legacy migration.

use serde::{Deserialize, Serialize};

/// Asset subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// How long the enabled type-rule list stays cached, in seconds.
    #[serde(default = "default_type_rule_cache_ttl")]
    pub type_rule_cache_ttl_seconds: u64,
    /// Directory (relative to the storage root) receiving migrated-away originals.
    #[serde(default = "default_backup_dir")]
    pub migration_backup_dir: String,
    /// Upper bound on how long the migration lock may be held, in seconds.
    #[serde(default = "default_migration_lock_ttl")]
    pub migration_lock_ttl_seconds: u64,
    /// Provisional rows older than this are considered abandoned.
    #[serde(default = "default_pending_retention")]
    pub pending_retention_hours: i64,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            type_rule_cache_ttl_seconds: default_type_rule_cache_ttl(),
            migration_backup_dir: default_backup_dir(),
            migration_lock_ttl_seconds: default_migration_lock_ttl(),
            pending_retention_hours: default_pending_retention(),
        }
    }
}

fn default_type_rule_cache_ttl() -> u64 {
    600
}

fn default_backup_dir() -> String {
    "_migration_backup".to_string()
}

fn default_migration_lock_ttl() -> u64 {
    3600
}

fn default_pending_retention() -> i64 {
    24
}
