//! Audit log records

use super::{Action, LogEntryId, UserId, ZoneId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit record before the store has assigned an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLogEntry {
    /// When the decision was taken
    pub timestamp: DateTime<Utc>,
    /// Zone record, absent when the code did not resolve
    pub zone: Option<ZoneId>,
    /// Zone code as requested
    pub zone_code: String,
    /// Acting user, absent for anonymous subjects
    pub user: Option<UserId>,
    /// Username captured at write time
    pub username: String,
    /// Decision outcome
    pub action: Action,
    /// Canned message for the action
    pub message: String,
    /// Free-form context such as "cached response"
    pub extra_data: String,
}

impl NewLogEntry {
    /// Attach the id assigned by the store
    pub fn with_id(self, id: LogEntryId) -> LogEntry {
        LogEntry {
            id,
            timestamp: self.timestamp,
            zone: self.zone,
            zone_code: self.zone_code,
            user: self.user,
            username: self.username,
            action: self.action,
            message: self.message,
            extra_data: self.extra_data,
        }
    }
}

/// Persisted, append-only audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Store-assigned identifier
    pub id: LogEntryId,
    /// When the decision was taken
    pub timestamp: DateTime<Utc>,
    /// Zone record, absent when the code did not resolve
    pub zone: Option<ZoneId>,
    /// Zone code as requested
    pub zone_code: String,
    /// Acting user, absent for anonymous subjects
    pub user: Option<UserId>,
    /// Username captured at write time
    pub username: String,
    /// Decision outcome
    pub action: Action,
    /// Canned message for the action
    pub message: String,
    /// Free-form context such as "cached response"
    pub extra_data: String,
}
