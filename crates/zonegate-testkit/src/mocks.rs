//! Counting and failure-injecting handlers

use crate::time::ControllableClock;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use zonegate_core::effects::{AuditStoreEffects, CacheEffects, RuleStoreEffects};
use zonegate_core::{
    GroupId, LogEntry, LogEntryId, NewLogEntry, Result, UserId, Zone, ZoneGateError, ZoneRule,
};
use zonegate_effects::{MemoryAuditStore, MemoryCacheHandler};

/// TTL cache that counts its calls
#[derive(Debug)]
pub struct CountingCache {
    inner: MemoryCacheHandler,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl CountingCache {
    /// Cache expiring against `clock`
    pub fn new(clock: ControllableClock) -> Self {
        Self {
            inner: MemoryCacheHandler::new(Arc::new(clock)),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
        }
    }

    /// Number of `get` calls
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `set_with_ttl` calls
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheEffects for CountingCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set_with_ttl(key, value, ttl).await
    }
}

/// Rule store wrapper counting how often the directory is consulted
pub struct CountingRuleStore {
    inner: Arc<dyn RuleStoreEffects>,
    zone_lookups: AtomicUsize,
    group_lookups: AtomicUsize,
}

impl CountingRuleStore {
    /// Wrap an existing store
    pub fn new(inner: Arc<dyn RuleStoreEffects>) -> Self {
        Self {
            inner,
            zone_lookups: AtomicUsize::new(0),
            group_lookups: AtomicUsize::new(0),
        }
    }

    /// Number of `get_zone_by_code` calls
    pub fn zone_lookups(&self) -> usize {
        self.zone_lookups.load(Ordering::SeqCst)
    }

    /// Number of `get_user_groups` calls
    pub fn group_lookups(&self) -> usize {
        self.group_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuleStoreEffects for CountingRuleStore {
    async fn get_zone_by_code(&self, code: &str) -> Result<Option<Zone>> {
        self.zone_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_zone_by_code(code).await
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.inner.list_zones().await
    }

    async fn list_group_rules(&self, zone: &Zone) -> Result<Vec<ZoneRule>> {
        self.inner.list_group_rules(zone).await
    }

    async fn list_user_rules(&self, zone: &Zone) -> Result<Vec<ZoneRule>> {
        self.inner.list_user_rules(zone).await
    }

    async fn get_user_groups(&self, user: UserId) -> Result<Vec<GroupId>> {
        self.group_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_user_groups(user).await
    }
}

/// Rule store whose backend is always down
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRuleStore;

#[async_trait]
impl RuleStoreEffects for FailingRuleStore {
    async fn get_zone_by_code(&self, _code: &str) -> Result<Option<Zone>> {
        Err(ZoneGateError::storage("directory unavailable"))
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        Err(ZoneGateError::storage("directory unavailable"))
    }

    async fn list_group_rules(&self, _zone: &Zone) -> Result<Vec<ZoneRule>> {
        Err(ZoneGateError::storage("directory unavailable"))
    }

    async fn list_user_rules(&self, _zone: &Zone) -> Result<Vec<ZoneRule>> {
        Err(ZoneGateError::storage("directory unavailable"))
    }

    async fn get_user_groups(&self, _user: UserId) -> Result<Vec<GroupId>> {
        Err(ZoneGateError::storage("directory unavailable"))
    }
}

/// Cache whose backend is always down
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCache;

#[async_trait]
impl CacheEffects for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(ZoneGateError::cache("cache unavailable"))
    }

    async fn set_with_ttl(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
        Err(ZoneGateError::cache("cache unavailable"))
    }
}

/// Audit store rejecting every write
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingAuditStore;

#[async_trait]
impl AuditStoreEffects for FailingAuditStore {
    async fn append(&self, _entry: NewLogEntry) -> Result<LogEntryId> {
        Err(ZoneGateError::audit("audit store unavailable"))
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<LogEntry>> {
        Err(ZoneGateError::audit("audit store unavailable"))
    }
}

/// Audit store that rejects its first `failures` writes, then records normally
#[derive(Debug)]
pub struct FlakyAuditStore {
    inner: MemoryAuditStore,
    failures_left: AtomicUsize,
}

impl FlakyAuditStore {
    /// Store failing the next `failures` appends
    pub fn new(failures: usize) -> Self {
        Self {
            inner: MemoryAuditStore::new(),
            failures_left: AtomicUsize::new(failures),
        }
    }

    /// Records that made it through
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.inner.entries().await
    }
}

#[async_trait]
impl AuditStoreEffects for FlakyAuditStore {
    async fn append(&self, entry: NewLogEntry) -> Result<LogEntryId> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ZoneGateError::audit("disk full"));
        }
        self.inner.append(entry).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.inner.recent(limit).await
    }
}
