//! Persistence traits for the asset subsystem.
//!
//! Services depend on these traits rather than on a concrete backend so the
//! same pipeline runs against PostgreSQL in production and against the
//! in-memory implementations in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use assethub_core::result::AppResult;
use assethub_core::types::PageResponse;
use assethub_entity::asset::{Asset, AssetBrowseQuery, AssetMetaUpdate, AssetStats, NewAsset};
use assethub_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use assethub_entity::type_rule::{TypeRule, TypeRuleInput};

/// The relational record of every asset.
///
/// `Err` is reserved for backend failures. Absent or already-applied
/// targets are reported through `Option`/`bool`/counts.
#[async_trait]
pub trait AssetRegistry: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a provisional row (`file_name` and `storage_path` set to
    /// `pending`) and return it with its newly allocated `file_id`.
    async fn create(&self, data: &NewAsset) -> AppResult<Asset>;

    /// Replace the placeholders of a provisional row after a successful write.
    async fn finalize(&self, file_id: i64, file_name: &str, storage_path: &str) -> AppResult<bool>;

    /// Hard-delete a provisional row whose write never completed.
    async fn rollback_create(&self, file_id: i64) -> AppResult<bool>;

    /// Find an asset by id, including soft-deleted ones.
    async fn find_by_id(&self, file_id: i64) -> AppResult<Option<Asset>>;

    /// Mark an asset deleted. `false` if absent or already deleted.
    async fn soft_delete(&self, file_id: i64) -> AppResult<bool>;

    /// Mark several assets deleted, returning how many changed state.
    async fn bulk_soft_delete(&self, file_ids: &[i64]) -> AppResult<u64>;

    /// Update display metadata of an active asset.
    async fn update_meta(&self, file_id: i64, update: &AssetMetaUpdate) -> AppResult<Option<Asset>>;

    /// Filtered, paginated listing, newest first.
    async fn browse(&self, query: &AssetBrowseQuery) -> AppResult<PageResponse<Asset>>;

    /// Registry-wide aggregates.
    async fn stats(&self) -> AppResult<AssetStats>;

    /// Active assets attached to an owning object, newest first.
    async fn list_for_object(&self, object_type: &str, object_id: i64) -> AppResult<Vec<Asset>>;

    /// Every finalized asset (deleted or not), ordered by id.
    async fn list_for_migration(&self) -> AppResult<Vec<Asset>>;

    /// Repoint a finalized asset at a new stored location.
    async fn update_storage_location(
        &self,
        file_id: i64,
        file_name: &str,
        storage_path: &str,
    ) -> AppResult<bool>;

    /// Hard-delete provisional rows created before `older_than`.
    async fn purge_pending(&self, older_than: DateTime<Utc>) -> AppResult<u64>;
}

/// Administrator-managed upload validation rules.
#[async_trait]
pub trait TypeRuleRepository: Send + Sync + std::fmt::Debug + 'static {
    /// All rules, ordered by category then display name.
    async fn list_all(&self) -> AppResult<Vec<TypeRule>>;

    /// Enabled rules only.
    async fn list_enabled(&self) -> AppResult<Vec<TypeRule>>;

    /// Find a rule by id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<TypeRule>>;

    /// Rules in a category (case-insensitive).
    async fn list_by_category(&self, category: &str) -> AppResult<Vec<TypeRule>>;

    /// Insert a rule.
    async fn create(&self, input: &TypeRuleInput) -> AppResult<TypeRule>;

    /// Replace a rule's editable fields.
    async fn update(&self, id: i64, input: &TypeRuleInput) -> AppResult<Option<TypeRule>>;

    /// Delete a rule.
    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Flip a rule's enabled flag.
    async fn toggle(&self, id: i64) -> AppResult<Option<TypeRule>>;
}

/// Append-only administrative audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync + std::fmt::Debug + 'static {
    /// Append an entry.
    async fn record(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry>;

    /// Most recent entries, optionally restricted to one action.
    async fn recent(&self, action: Option<&str>, limit: i64) -> AppResult<Vec<AuditLogEntry>>;
}
