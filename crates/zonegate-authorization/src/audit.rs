//! Audit logging of access decisions

use std::sync::Arc;
use tracing::{error, info};
use zonegate_core::effects::{AuditStoreEffects, ClockEffects};
use zonegate_core::{Action, LogEntry, NewLogEntry, Result, UserRef, ZoneGateError, ZoneId};

/// Writes one audit record per decision
///
/// The username is copied into the record at write time so the trail stays
/// readable after the account is renamed or removed.
#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn AuditStoreEffects>,
    clock: Arc<dyn ClockEffects>,
}

impl AuditLogger {
    /// Create a logger over an audit store
    pub fn new(store: Arc<dyn AuditStoreEffects>, clock: Arc<dyn ClockEffects>) -> Self {
        Self { store, clock }
    }

    /// Append a record; every failure surfaces as `ZoneGateError::Audit`
    pub async fn record(
        &self,
        zone: Option<ZoneId>,
        zone_code: &str,
        user: &UserRef,
        action: Action,
        message: &str,
        extra_data: &str,
    ) -> Result<LogEntry> {
        let entry = NewLogEntry {
            timestamp: self.clock.now().await,
            zone,
            zone_code: zone_code.to_string(),
            user: user.user_id(),
            username: user.username().to_string(),
            action,
            message: message.to_string(),
            extra_data: extra_data.to_string(),
        };

        info!(
            zone = %zone_code,
            action = %action,
            user = %entry.username,
            user_id = %user.cache_id(),
            extra = %extra_data,
            "{message}"
        );

        match self.store.append(entry.clone()).await {
            Ok(id) => Ok(entry.with_id(id)),
            Err(err) => {
                error!(zone = %zone_code, action = %action, error = %err, "Audit write failed");
                Err(match err {
                    ZoneGateError::Audit { .. } => err,
                    other => ZoneGateError::audit(other.to_string()),
                })
            }
        }
    }

    /// Most recent records first
    pub async fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.store.recent(limit).await
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}
