//! Storage manager: routes operations to the provider recorded on each asset.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use assethub_core::config::StorageConfig;
use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::traits::storage::StorageProvider;
use assethub_entity::storage::StorageProviderType;

use crate::providers::LocalStorageProvider;

/// Central storage manager that holds references to all registered providers.
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// Map of lowercase provider name to provider instance.
    providers: Arc<RwLock<HashMap<String, Arc<dyn StorageProvider>>>>,
    /// Provider used for new uploads.
    default_name: Arc<RwLock<Option<String>>>,
}

impl StorageManager {
    /// Create a new empty storage manager.
    pub fn new() -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
            default_name: Arc::new(RwLock::new(None)),
        }
    }

    /// Build a manager with every provider enabled in configuration.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let default: StorageProviderType = config.default_provider.parse()?;
        let manager = Self::new();

        let local = LocalStorageProvider::new(&config.local.root_path).await?;
        info!(root = %config.local.root_path, "Local storage provider ready");
        manager
            .register(
                StorageProviderType::Local.as_str(),
                Arc::new(local),
                default == StorageProviderType::Local,
            )
            .await;

        if config.s3.enabled {
            #[cfg(feature = "s3")]
            {
                let s3 = crate::providers::S3StorageProvider::new(&config.s3).await?;
                manager
                    .register(
                        StorageProviderType::S3.as_str(),
                        Arc::new(s3),
                        default == StorageProviderType::S3,
                    )
                    .await;
            }
            #[cfg(not(feature = "s3"))]
            return Err(AppError::configuration(
                "storage.s3.enabled is set but S3 support was not compiled in",
            ));
        }

        if manager.default_name.read().await.is_none() {
            return Err(AppError::configuration(format!(
                "Default storage provider '{default}' is not enabled"
            )));
        }
        Ok(manager)
    }

    /// Register a storage provider under a name.
    pub async fn register(&self, name: &str, provider: Arc<dyn StorageProvider>, is_default: bool) {
        let name = name.to_lowercase();
        let mut providers = self.providers.write().await;
        providers.insert(name.clone(), provider);
        if is_default {
            let mut default = self.default_name.write().await;
            *default = Some(name);
        }
    }

    /// Get a provider by name (case-insensitive).
    pub async fn get(&self, name: &str) -> AppResult<Arc<dyn StorageProvider>> {
        let providers = self.providers.read().await;
        providers
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| AppError::configuration(format!("Storage provider '{name}' is not configured")))
    }

    /// Get the provider used for new uploads, with its name.
    pub async fn get_default(&self) -> AppResult<(String, Arc<dyn StorageProvider>)> {
        let name = {
            let default = self.default_name.read().await;
            default
                .clone()
                .ok_or_else(|| AppError::configuration("No default storage configured"))?
        };
        let provider = self.get(&name).await?;
        Ok((name, provider))
    }

    /// Names of all registered providers.
    pub async fn names(&self) -> Vec<String> {
        let providers = self.providers.read().await;
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check health of all registered providers.
    pub async fn health_check_all(&self) -> HashMap<String, bool> {
        let providers = self.providers.read().await;
        let mut results = HashMap::new();
        for (name, provider) in providers.iter() {
            let healthy = provider.health_check().await.unwrap_or(false);
            results.insert(name.clone(), healthy);
        }
        results
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}
