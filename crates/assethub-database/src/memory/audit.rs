//! In-memory audit log.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use assethub_core::result::AppResult;
use assethub_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use crate::traits::AuditLog;

/// Audit log appending to a vector.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl MemoryAuditLog {
    /// Create an empty audit log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let mut entries = self.entries.write().await;
        let stored = AuditLogEntry {
            id: entries.len() as i64 + 1,
            actor_id: entry.actor_id,
            action: entry.action.clone(),
            target_type: entry.target_type.clone(),
            target_id: entry.target_id,
            details: entry.details.clone(),
            created_at: Utc::now(),
        };
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, action: Option<&str>, limit: i64) -> AppResult<Vec<AuditLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|e| action.is_none_or(|a| e.action == a))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
