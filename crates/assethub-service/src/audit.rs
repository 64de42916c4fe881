//! Best-effort audit trail writes.

use serde_json::Value;
use tracing::warn;

use assethub_database::AuditLog;
use assethub_entity::audit::CreateAuditLogEntry;

/// Append an audit entry. Failures are logged and swallowed.
pub async fn record(
    audit: &dyn AuditLog,
    actor_id: Option<i64>,
    action: &str,
    target_id: Option<i64>,
    details: Value,
) {
    let entry = CreateAuditLogEntry {
        actor_id,
        action: action.to_string(),
        target_type: "asset".to_string(),
        target_id,
        details: Some(details),
    };
    if let Err(e) = audit.record(&entry).await {
        warn!(action, error = %e, "Failed to write audit log entry");
    }
}
