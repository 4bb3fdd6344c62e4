//! Append-only JSON lines audit store

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use zonegate_core::effects::AuditStoreEffects;
use zonegate_core::{LogEntry, LogEntryId, NewLogEntry, Result, ZoneGateError};

/// Audit store writing one JSON document per line
///
/// Records are never rewritten. Ids continue from the highest id found in the
/// file when it is opened.
#[derive(Debug, Clone)]
pub struct JsonlAuditStore {
    path: PathBuf,
    last_id: Arc<Mutex<u64>>,
}

impl JsonlAuditStore {
    /// Open (or prepare to create) the log file at `path`
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let last_id = read_entries(&path)
            .await?
            .iter()
            .map(|entry| entry.id.value())
            .max()
            .unwrap_or(0);
        debug!(path = %path.display(), last_id, "Opened audit log");
        Ok(Self {
            path,
            last_id: Arc::new(Mutex::new(last_id)),
        })
    }

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditStoreEffects for JsonlAuditStore {
    async fn append(&self, entry: NewLogEntry) -> Result<LogEntryId> {
        // Held across the write so ids and lines stay in the same order.
        let mut last_id = self.last_id.lock().await;
        let id = LogEntryId(*last_id + 1);

        let mut line = serde_json::to_vec(&entry.with_id(id))?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| audit_io_error(&self.path, e))?;
        file.write_all(&line)
            .await
            .map_err(|e| audit_io_error(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| audit_io_error(&self.path, e))?;

        *last_id = id.value();
        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let mut entries = read_entries(&self.path).await?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        entries.truncate(limit);
        Ok(entries)
    }
}

async fn read_entries(path: &Path) -> Result<Vec<LogEntry>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(audit_io_error(path, e)),
    };

    let mut entries = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(
                path = %path.display(),
                line = number + 1,
                error = %err,
                "Skipping malformed audit line"
            ),
        }
    }
    Ok(entries)
}

fn audit_io_error(path: &Path, err: std::io::Error) -> ZoneGateError {
    ZoneGateError::audit(format!("{}: {err}", path.display()))
}
