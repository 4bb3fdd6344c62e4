//! Shared engine harness for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use zonegate_authorization::ZoneAccessEngine;
use zonegate_core::effects::{AuditStoreEffects, CacheEffects, RuleStoreEffects};
use zonegate_core::{AccessLevel, LogEntry, ZoneAccessConfig};
use zonegate_effects::{MemoryAuditStore, MemoryDirectory};
use zonegate_testkit::{ControllableClock, CountingCache, CountingRuleStore};

/// Engine wired to in-memory handlers that tests can inspect
pub struct Harness {
    pub engine: ZoneAccessEngine,
    pub directory: MemoryDirectory,
    pub store: Arc<CountingRuleStore>,
    pub cache: Arc<CountingCache>,
    pub audit: MemoryAuditStore,
    pub clock: ControllableClock,
}

impl Harness {
    pub fn new(directory: MemoryDirectory, config: ZoneAccessConfig) -> Self {
        let clock = ControllableClock::default();
        let store = Arc::new(CountingRuleStore::new(Arc::new(directory.clone())));
        let cache = Arc::new(CountingCache::new(clock.clone()));
        let audit = MemoryAuditStore::new();
        let engine = ZoneAccessEngine::new(
            config,
            store.clone(),
            cache.clone(),
            Arc::new(audit.clone()),
            Arc::new(clock.clone()),
        );
        Self {
            engine,
            directory,
            store,
            cache,
            audit,
            clock,
        }
    }

    pub async fn entries(&self) -> Vec<LogEntry> {
        self.audit.entries().await
    }
}

/// Engine over arbitrary collaborators
pub fn engine_with(
    config: ZoneAccessConfig,
    store: Arc<dyn RuleStoreEffects>,
    cache: Arc<dyn CacheEffects>,
    audit: Arc<dyn AuditStoreEffects>,
) -> ZoneAccessEngine {
    ZoneAccessEngine::new(
        config,
        store,
        cache,
        audit,
        Arc::new(ControllableClock::default()),
    )
}

pub fn config(
    cache_time_secs: u64,
    log_cached: bool,
    allowed_log_threshold_secs: u64,
    default_response: AccessLevel,
) -> ZoneAccessConfig {
    ZoneAccessConfig {
        cache_time_secs,
        log_cached,
        allowed_log_threshold_secs,
        default_response,
    }
}

/// No caching, no debounce, deny by default
pub fn uncached() -> ZoneAccessConfig {
    ZoneAccessConfig::default()
}
