//! In-memory audit store for testing and single-process deployments

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use zonegate_core::effects::AuditStoreEffects;
use zonegate_core::{LogEntry, LogEntryId, NewLogEntry, Result};

/// Audit store keeping every record in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditStore {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl MemoryAuditStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record in append order
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().await.clone()
    }

    /// Number of records
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing was recorded
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AuditStoreEffects for MemoryAuditStore {
    async fn append(&self, entry: NewLogEntry) -> Result<LogEntryId> {
        let mut entries = self.entries.write().await;
        let id = LogEntryId(entries.len() as u64 + 1);
        entries.push(entry.with_id(id));
        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let entries = self.entries.read().await;
        let mut recent: Vec<LogEntry> = entries.iter().rev().take(limit).cloned().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(recent)
    }
}
