//! Single-flight guard for the legacy migration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};
use uuid::Uuid;

use assethub_cache::{CacheManager, keys};
use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::traits::cache::CacheProvider;

/// Serializes migration runs through a lock held in the shared cache.
///
/// With the Redis provider the lock spans every service instance; with the
/// in-memory provider it only spans the current process.
#[derive(Debug, Clone)]
pub struct MigrationGuard {
    cache: Arc<CacheManager>,
    ttl: Duration,
}

impl MigrationGuard {
    /// Creates a new guard. `ttl` bounds how long a crashed holder can
    /// keep the lock.
    pub fn new(cache: Arc<CacheManager>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Run `work` while holding the lock. Fails fast with `Conflict` if
    /// another run holds it.
    ///
    /// Acquire, `work` and release all happen on a spawned task, so dropping
    /// the caller does not stop a batch between items or strand the lock.
    pub async fn run<F, T>(&self, work: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let cache = self.cache.clone();
        let ttl = self.ttl;
        let token = Uuid::new_v4().to_string();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            if !cache.set_nx(&keys::migration_lock(), &task_token, ttl).await? {
                return Err(AppError::conflict("A migration is already in progress"));
            }
            debug!(token = %task_token, "Migration lock acquired");

            let result = work.await;
            release(&cache, &task_token).await;
            result
        });

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Migration task aborted");
                release(&self.cache, &token).await;
                Err(AppError::internal(format!("Migration task aborted: {e}")))
            }
        }
    }

    /// Whether a run currently holds the lock.
    pub async fn is_locked(&self) -> AppResult<bool> {
        self.cache.exists(&keys::migration_lock()).await
    }
}

async fn release(cache: &CacheManager, token: &str) {
    match cache.compare_and_delete(&keys::migration_lock(), token).await {
        Ok(true) => debug!(token = %token, "Migration lock released"),
        Ok(false) => warn!(token = %token, "Migration lock expired before release"),
        Err(e) => warn!(error = %e, "Failed to release migration lock"),
    }
}
