//! Decision caching and grant-log debouncing
//!
//! Two independent key spaces share one cache collaborator:
//!
//! - `zone_access:decision:{zone}:{user}` holds the last decision for the
//!   `cache_time` TTL. A hit skips the rule store and the audit log.
//! - `zone_access:grant_log:{zone}:{user}` marks that a grant was logged,
//!   for the `allowed_log_threshold` TTL. While present, further grants for
//!   the same subject are not written to the audit log.
//!
//! A disabled TTL bypasses its key space without touching the collaborator.

use crate::decisions::Decision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use zonegate_core::effects::CacheEffects;
use zonegate_core::{AccessLevel, Action, Result, UserId, ZoneAccessConfig, ZoneId};

const DECISION_PREFIX: &str = "zone_access:decision";
const GRANT_LOG_PREFIX: &str = "zone_access:grant_log";

/// Decision as stored in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedDecision {
    /// Action taken when the entry was computed
    pub action: Action,
    /// Effective access when the entry was computed
    pub access: AccessLevel,
    /// Zone record, kept so cached re-logs can reference it
    pub zone: Option<ZoneId>,
    /// When the entry was computed
    pub cached_at: DateTime<Utc>,
}

impl CachedDecision {
    /// Decision part of the entry
    pub fn decision(&self) -> Decision {
        Decision::new(self.action, self.access)
    }
}

/// TTL-bound memo of decisions per (zone code, user)
#[derive(Clone)]
pub struct DecisionCache {
    cache: Arc<dyn CacheEffects>,
    decision_ttl: Option<Duration>,
    grant_log_ttl: Option<Duration>,
}

impl DecisionCache {
    /// Build from the engine configuration
    pub fn new(cache: Arc<dyn CacheEffects>, config: &ZoneAccessConfig) -> Self {
        Self {
            cache,
            decision_ttl: config.cache_ttl(),
            grant_log_ttl: config.allowed_log_ttl(),
        }
    }

    /// Key of the decision entry
    pub fn decision_key(zone_code: &str, user: UserId) -> String {
        format!("{DECISION_PREFIX}:{zone_code}:{user}")
    }

    /// Key of the grant debounce marker
    pub fn grant_log_key(zone_code: &str, user: UserId) -> String {
        format!("{GRANT_LOG_PREFIX}:{zone_code}:{user}")
    }

    /// Whether decisions are memoized at all
    pub fn is_enabled(&self) -> bool {
        self.decision_ttl.is_some()
    }

    /// Cached decision for the pair, if any
    ///
    /// Entries that no longer decode are treated as misses.
    pub async fn lookup(&self, zone_code: &str, user: UserId) -> Result<Option<CachedDecision>> {
        if self.decision_ttl.is_none() {
            return Ok(None);
        }
        let key = Self::decision_key(zone_code, user);
        let Some(raw) = self.cache.get(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_slice::<CachedDecision>(&raw) {
            Ok(entry) => {
                debug!(key = %key, action = %entry.action, "Decision cache hit");
                Ok(Some(entry))
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Remember a freshly computed decision
    pub async fn store(&self, zone_code: &str, user: UserId, entry: &CachedDecision) -> Result<()> {
        let Some(ttl) = self.decision_ttl else {
            return Ok(());
        };
        let key = Self::decision_key(zone_code, user);
        let raw = serde_json::to_vec(entry)?;
        self.cache.set_with_ttl(&key, raw, ttl).await
    }

    /// Whether a grant for the pair was logged within the threshold
    ///
    /// Read-only; the marker is armed by [`Self::mark_grant_logged`] once the
    /// record has actually been written.
    pub async fn grant_recently_logged(&self, zone_code: &str, user: UserId) -> Result<bool> {
        if self.grant_log_ttl.is_none() {
            return Ok(false);
        }
        let key = Self::grant_log_key(zone_code, user);
        let live = self.cache.get(&key).await?.is_some();
        if live {
            debug!(key = %key, "Suppressing repeated grant log entry");
        }
        Ok(live)
    }

    /// Arm the debounce marker after a grant reached the audit log
    pub async fn mark_grant_logged(&self, zone_code: &str, user: UserId) -> Result<()> {
        let Some(ttl) = self.grant_log_ttl else {
            return Ok(());
        };
        let key = Self::grant_log_key(zone_code, user);
        self.cache.set_with_ttl(&key, b"1".to_vec(), ttl).await
    }
}

impl std::fmt::Debug for DecisionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionCache")
            .field("decision_ttl", &self.decision_ttl)
            .field("grant_log_ttl", &self.grant_log_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonegate_testkit::{ControllableClock, CountingCache};

    fn config(cache_time_secs: u64, allowed_log_threshold_secs: u64) -> ZoneAccessConfig {
        ZoneAccessConfig {
            cache_time_secs,
            allowed_log_threshold_secs,
            ..ZoneAccessConfig::default()
        }
    }

    fn entry(clock: &ControllableClock) -> CachedDecision {
        CachedDecision {
            action: Action::Access,
            access: AccessLevel::Allowed,
            zone: Some(ZoneId(1)),
            cached_at: clock.current(),
        }
    }

    #[tokio::test]
    async fn disabled_cache_never_calls_collaborator() {
        let clock = ControllableClock::default();
        let backend = Arc::new(CountingCache::new(clock.clone()));
        let cache = DecisionCache::new(backend.clone(), &config(0, 0));

        cache.store("wiki", UserId(1), &entry(&clock)).await.unwrap();
        assert_eq!(cache.lookup("wiki", UserId(1)).await.unwrap(), None);
        assert!(!cache.grant_recently_logged("wiki", UserId(1)).await.unwrap());
        cache.mark_grant_logged("wiki", UserId(1)).await.unwrap();
        assert!(!cache.grant_recently_logged("wiki", UserId(1)).await.unwrap());
        assert!(!cache.is_enabled());
        assert_eq!(backend.gets(), 0);
        assert_eq!(backend.sets(), 0);
    }

    #[tokio::test]
    async fn stored_decision_expires_after_ttl() {
        let clock = ControllableClock::default();
        let backend = Arc::new(CountingCache::new(clock.clone()));
        let cache = DecisionCache::new(backend, &config(60, 0));

        let stored = entry(&clock);
        cache.store("wiki", UserId(1), &stored).await.unwrap();
        assert_eq!(cache.lookup("wiki", UserId(1)).await.unwrap(), Some(stored));
        assert_eq!(cache.lookup("wiki", UserId(2)).await.unwrap(), None);

        clock.advance_secs(61);
        assert_eq!(cache.lookup("wiki", UserId(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn grant_debounce_suppresses_within_window() {
        let clock = ControllableClock::default();
        let backend = Arc::new(CountingCache::new(clock.clone()));
        let cache = DecisionCache::new(backend, &config(0, 300));

        // Checking alone never arms the marker.
        assert!(!cache.grant_recently_logged("wiki", UserId(1)).await.unwrap());
        assert!(!cache.grant_recently_logged("wiki", UserId(1)).await.unwrap());

        cache.mark_grant_logged("wiki", UserId(1)).await.unwrap();
        assert!(cache.grant_recently_logged("wiki", UserId(1)).await.unwrap());
        assert!(!cache.grant_recently_logged("wiki", UserId(2)).await.unwrap());

        clock.advance_secs(301);
        assert!(!cache.grant_recently_logged("wiki", UserId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss() {
        let clock = ControllableClock::default();
        let backend = Arc::new(CountingCache::new(clock.clone()));
        backend
            .set_with_ttl(
                &DecisionCache::decision_key("wiki", UserId(1)),
                b"not json".to_vec(),
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        let cache = DecisionCache::new(backend, &config(60, 0));
        assert_eq!(cache.lookup("wiki", UserId(1)).await.unwrap(), None);
    }

    #[test]
    fn key_spaces_are_distinct() {
        assert_ne!(
            DecisionCache::decision_key("wiki", UserId(1)),
            DecisionCache::grant_log_key("wiki", UserId(1))
        );
        assert_eq!(
            DecisionCache::decision_key("wiki", UserId::ANONYMOUS),
            "zone_access:decision:wiki:0"
        );
    }
}
