//! Rewrites legacy randomly-named blobs into the identity-addressed layout.
//!
//! Per asset, in order: copy the legacy blob to its new path, repoint the
//! registry row, then move the original into the backup directory. A crash
//! between steps leaves at most a duplicate, never a missing blob, and a
//! rerun skips rows already carrying their identity-derived name.

use std::sync::Arc;

use regex::Regex;
use tracing::{error, info, warn};

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_database::{AssetRegistry, AuditLog};
use assethub_entity::asset::{Asset, extension_of};
use assethub_entity::migration::{MigrationItem, MigrationReport, MigrationStatus};
use assethub_storage::{StorageManager, layout};

use super::guard::MigrationGuard;
use crate::audit;

/// `8-4-4-4-12` hexadecimal token followed by an extension.
const LEGACY_NAME: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\.\w+$";

/// Matcher for legacy stored filenames.
#[derive(Debug, Clone)]
pub struct LegacyNamePattern(Regex);

impl LegacyNamePattern {
    /// Compile the pattern.
    pub fn new() -> AppResult<Self> {
        Regex::new(LEGACY_NAME)
            .map(Self)
            .map_err(|e| AppError::internal(format!("Invalid legacy filename pattern: {e}")))
    }

    /// Whether a bare filename follows the legacy convention.
    pub fn is_legacy(&self, file_name: &str) -> bool {
        self.0.is_match(file_name)
    }
}

/// Preview or execute the legacy layout migration.
#[derive(Debug, Clone)]
pub struct LegacyMigrator {
    registry: Arc<dyn AssetRegistry>,
    storage: Arc<StorageManager>,
    audit: Arc<dyn AuditLog>,
    guard: MigrationGuard,
    pattern: LegacyNamePattern,
    backup_dir: String,
}

impl LegacyMigrator {
    /// Creates a new migrator.
    pub fn new(
        registry: Arc<dyn AssetRegistry>,
        storage: Arc<StorageManager>,
        audit: Arc<dyn AuditLog>,
        guard: MigrationGuard,
        backup_dir: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            registry,
            storage,
            audit,
            guard,
            pattern: LegacyNamePattern::new()?,
            backup_dir: backup_dir.into(),
        })
    }

    /// Report what an execute run would do without changing anything.
    pub async fn preview(&self, actor_id: Option<i64>) -> AppResult<MigrationReport> {
        self.run_guarded(true, actor_id).await
    }

    /// Migrate every legacy-named asset. Per-item failures are recorded in
    /// the report; only a failure to list candidates aborts the run.
    ///
    /// The batch and its audit entry complete even if the caller is dropped.
    pub async fn execute(&self, actor_id: Option<i64>) -> AppResult<MigrationReport> {
        self.run_guarded(false, actor_id).await
    }

    async fn run_guarded(&self, is_preview: bool, actor_id: Option<i64>) -> AppResult<MigrationReport> {
        let action = if is_preview {
            "asset.migration.preview"
        } else {
            "asset.migration.execute"
        };
        let this = self.clone();
        self.guard
            .run(async move {
                let report = this.scan(is_preview).await?;
                this.audit_run(action, actor_id, &report).await;
                Ok(report)
            })
            .await
    }

    async fn scan(&self, is_preview: bool) -> AppResult<MigrationReport> {
        let assets = self.registry.list_for_migration().await?;
        let mut report = MigrationReport::new(is_preview);
        report.total_assets = assets.len();

        for asset in &assets {
            let legacy_name = asset.stored_file_name();
            if !self.pattern.is_legacy(legacy_name) {
                report.already_migrated += 1;
                continue;
            }
            report.needs_migration += 1;

            let extension = extension_of(legacy_name);
            let new_path = layout::asset_path(
                asset.folder_or_default(),
                asset.created_at,
                asset.file_id,
                &extension,
            );

            let item = if is_preview {
                MigrationItem {
                    file_id: asset.file_id,
                    old_path: asset.storage_path.clone(),
                    new_path,
                    status: MigrationStatus::Pending,
                    error: None,
                }
            } else {
                self.migrate_one(asset, new_path, &extension).await
            };
            report.record(item);
        }

        info!(
            preview = is_preview,
            total = report.total_assets,
            needs_migration = report.needs_migration,
            success = report.success_count,
            errors = report.error_count,
            not_found = report.file_not_found_count,
            "Legacy migration run finished"
        );
        Ok(report)
    }

    async fn migrate_one(&self, asset: &Asset, new_path: String, extension: &str) -> MigrationItem {
        let mut item = MigrationItem {
            file_id: asset.file_id,
            old_path: asset.storage_path.clone(),
            new_path,
            status: MigrationStatus::Pending,
            error: None,
        };

        match self.relocate(asset, &item.new_path, extension).await {
            Ok(true) => item.status = MigrationStatus::Success,
            Ok(false) => {
                warn!(file_id = asset.file_id, path = %item.old_path, "Legacy source file not found");
                item.status = MigrationStatus::FileNotFound;
                item.error = Some(format!("Source file not found: {}", item.old_path));
            }
            Err(e) => {
                error!(file_id = asset.file_id, error = %e, "Failed to migrate asset");
                item.status = MigrationStatus::Error;
                item.error = Some(e.message);
            }
        }
        item
    }

    /// Copy, repoint, back up. `Ok(false)` when the source is absent.
    async fn relocate(&self, asset: &Asset, new_path: &str, extension: &str) -> AppResult<bool> {
        let provider = self.storage.get(&asset.storage_provider).await?;
        let old_path = asset.storage_path.as_str();

        if !provider.exists(old_path).await? {
            return Ok(false);
        }

        provider.copy(old_path, new_path).await?;

        let new_file_name = layout::asset_file_name(asset.file_id, extension);
        let repointed = self
            .registry
            .update_storage_location(asset.file_id, &new_file_name, new_path)
            .await?;
        if !repointed {
            return Err(AppError::not_found(format!(
                "Asset {} disappeared during migration",
                asset.file_id
            )));
        }

        let backup = layout::backup_path(
            &self.backup_dir,
            asset.folder_or_default(),
            asset.stored_file_name(),
        );
        provider.rename(old_path, &backup).await?;

        info!(file_id = asset.file_id, from = %old_path, to = %new_path, "Asset migrated");
        Ok(true)
    }

    async fn audit_run(&self, action: &str, actor_id: Option<i64>, report: &MigrationReport) {
        let mut details = report.summary();
        if let Some(map) = details.as_object_mut() {
            map.insert(
                "items".to_string(),
                serde_json::to_value(&report.items).unwrap_or_default(),
            );
        }
        audit::record(self.audit.as_ref(), actor_id, action, None, details).await;
    }
}
