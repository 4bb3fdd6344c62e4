//! Append-only audit trail

use crate::errors::Result;
use crate::types::{LogEntry, LogEntryId, NewLogEntry};
use async_trait::async_trait;
use std::sync::Arc;

/// Durable storage for audit records
#[async_trait]
pub trait AuditStoreEffects: Send + Sync {
    /// Persist a record and return the id assigned to it
    async fn append(&self, entry: NewLogEntry) -> Result<LogEntryId>;

    /// Most recent records first, at most `limit` of them
    async fn recent(&self, limit: usize) -> Result<Vec<LogEntry>>;
}

#[async_trait]
impl<T: AuditStoreEffects + ?Sized> AuditStoreEffects for Arc<T> {
    async fn append(&self, entry: NewLogEntry) -> Result<LogEntryId> {
        (**self).append(entry).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        (**self).recent(limit).await
    }
}
