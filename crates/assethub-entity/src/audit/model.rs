//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An immutable audit log entry recording an administrative action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: i64,
    /// The actor who performed the action, when known.
    pub actor_id: Option<i64>,
    /// The action that was performed (e.g., `"asset.migration.execute"`).
    pub action: String,
    /// The type of target resource (e.g., `"asset"`).
    pub target_type: String,
    /// The target resource ID (if applicable).
    pub target_id: Option<i64>,
    /// Additional details about the action (JSON).
    pub details: Option<serde_json::Value>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// The actor who performed the action.
    pub actor_id: Option<i64>,
    /// The action performed.
    pub action: String,
    /// Target resource type.
    pub target_type: String,
    /// Target resource ID.
    pub target_id: Option<i64>,
    /// Additional details.
    pub details: Option<serde_json::Value>,
}
