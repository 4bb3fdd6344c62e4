//! In-process TTL cache

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use zonegate_core::effects::{CacheEffects, ClockEffects};
use zonegate_core::{Result, ZoneGateError};

#[derive(Debug, Clone)]
struct CacheSlot {
    value: Vec<u8>,
    expires_at: DateTime<Utc>,
}

/// Key-value cache shared by all request handlers of one process
///
/// Expiry is measured against the injected clock, so tests can move time
/// forward instead of sleeping.
#[derive(Clone)]
pub struct MemoryCacheHandler {
    slots: Arc<RwLock<HashMap<String, CacheSlot>>>,
    clock: Arc<dyn ClockEffects>,
}

impl MemoryCacheHandler {
    /// Create an empty cache
    pub fn new(clock: Arc<dyn ClockEffects>) -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Drop every expired slot, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now().await;
        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|_, slot| slot.expires_at > now);
        before - slots.len()
    }

    /// Number of stored slots, live or not
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[async_trait]
impl CacheEffects for MemoryCacheHandler {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = self.clock.now().await;
        let slots = self.slots.read().await;
        Ok(slots
            .get(key)
            .filter(|slot| slot.expires_at > now)
            .map(|slot| slot.value.clone()))
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| ZoneGateError::cache(format!("TTL out of range: {e}")))?;
        let now = self.clock.now().await;
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            ZoneGateError::cache(format!(
                "TTL of {}s overflows the clock",
                ttl.num_seconds()
            ))
        })?;
        self.slots
            .write()
            .await
            .insert(key.to_string(), CacheSlot { value, expires_at });
        Ok(())
    }
}

impl std::fmt::Debug for MemoryCacheHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheHandler").finish_non_exhaustive()
    }
}
