//! Zone access decision engine
//!
//! Ties the rule store, the access matrix, the action state machine, the
//! decision cache and the audit logger together behind the two entry points
//! used by the boundary layer.
//!
//! Rule-store and cache failures are returned as `Err`. Audit failures never
//! change a decision: they are reported next to it in [`AuditOutcome`].

use crate::audit::AuditLogger;
use crate::cache::{CachedDecision, DecisionCache};
use crate::decisions::{audit_message, resolve_action, Decision, Verdict, LOGIN_MESSAGE};
use crate::matrix::AccessMatrix;
use std::sync::Arc;
use tracing::{debug, warn};
use zonegate_core::effects::{AuditStoreEffects, CacheEffects, ClockEffects, RuleStoreEffects};
use zonegate_core::{
    AccessLevel, Action, LogEntry, Result, UserRef, ZoneAccessConfig, ZoneGateError, ZoneId,
};

/// Extra data attached to entries re-logged from the cache
pub const CACHED_RESPONSE: &str = "cached response";

/// What happened to the audit record of a decision
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditOutcome {
    /// Record written, if one was due and the write succeeded
    pub entry: Option<LogEntry>,
    /// Write failure, if any
    pub error: Option<ZoneGateError>,
}

impl AuditOutcome {
    /// Nothing was due to be written
    pub fn skipped() -> Self {
        Self::default()
    }

    fn from_result(result: Result<LogEntry>) -> Self {
        match result {
            Ok(entry) => Self {
                entry: Some(entry),
                error: None,
            },
            Err(error) => Self {
                entry: None,
                error: Some(error),
            },
        }
    }

    /// Whether a record was written
    pub fn is_logged(&self) -> bool {
        self.entry.is_some()
    }
}

/// Result of `process_access_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessOutcome {
    /// Terminal action
    pub action: Action,
    /// Effective access
    pub access: AccessLevel,
    /// Served from the decision cache
    pub cached: bool,
    /// Audit side of the decision
    pub audit: AuditOutcome,
}

impl AccessOutcome {
    /// Action and access as a plain decision
    pub fn decision(&self) -> Decision {
        Decision::new(self.action, self.access)
    }
}

/// Result of `process_login`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Whether the login may complete for the zone
    pub allowed: bool,
    /// Raw fold result the gate was evaluated on
    pub access: AccessLevel,
    /// Audit side of the login
    pub audit: AuditOutcome,
}

/// The decision engine
#[derive(Clone)]
pub struct ZoneAccessEngine {
    config: ZoneAccessConfig,
    store: Arc<dyn RuleStoreEffects>,
    cache: DecisionCache,
    audit: AuditLogger,
    clock: Arc<dyn ClockEffects>,
}

impl ZoneAccessEngine {
    /// Wire the engine to its collaborators
    pub fn new(
        config: ZoneAccessConfig,
        store: Arc<dyn RuleStoreEffects>,
        cache: Arc<dyn CacheEffects>,
        audit: Arc<dyn AuditStoreEffects>,
        clock: Arc<dyn ClockEffects>,
    ) -> Self {
        let cache = DecisionCache::new(cache, &config);
        let audit = AuditLogger::new(audit, clock.clone());
        Self {
            config,
            store,
            cache,
            audit,
            clock,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ZoneAccessConfig {
        &self.config
    }

    /// Underlying rule store
    pub fn store(&self) -> &Arc<dyn RuleStoreEffects> {
        &self.store
    }

    /// Audit logger
    pub fn audit_logger(&self) -> &AuditLogger {
        &self.audit
    }

    /// Decide whether `user` may enter the zone named `zone_code`
    ///
    /// Unknown and disabled zones are ordinary actions, not errors.
    pub async fn process_access_request(
        &self,
        zone_code: &str,
        user: &UserRef,
    ) -> Result<AccessOutcome> {
        let user_id = user.cache_id();

        if let Some(hit) = self.cache.lookup(zone_code, user_id).await? {
            let audit = if self.config.log_cached {
                self.log_decision(hit.zone, zone_code, user, hit.action, CACHED_RESPONSE)
                    .await?
            } else {
                AuditOutcome::skipped()
            };
            return Ok(AccessOutcome {
                action: hit.action,
                access: hit.access,
                cached: true,
                audit,
            });
        }

        let (zone_id, verdict) = self.evaluate(zone_code, user).await?;
        let decision = resolve_action(
            verdict,
            user.is_authenticated(),
            self.config.default_response,
        );
        debug!(
            zone = %zone_code,
            user = %user_id,
            action = %decision.action,
            access = %decision.access,
            "Resolved zone access"
        );

        let audit = self
            .log_decision(zone_id, zone_code, user, decision.action, "")
            .await?;

        let entry = CachedDecision {
            action: decision.action,
            access: decision.access,
            zone: zone_id,
            cached_at: self.clock.now().await,
        };
        self.cache.store(zone_code, user_id, &entry).await?;

        Ok(AccessOutcome {
            action: decision.action,
            access: decision.access,
            cached: false,
            audit,
        })
    }

    /// Gate an interactive login on the zone's rules
    ///
    /// Only an explicit ALLOWED from the fold lets the login through; a
    /// DEFAULT fold is not upgraded by the configured default response here.
    pub async fn process_login(&self, zone_code: &str, user: &UserRef) -> Result<LoginOutcome> {
        let denied = |access| LoginOutcome {
            allowed: false,
            access,
            audit: AuditOutcome::skipped(),
        };

        if !user.is_authenticated() {
            warn!(zone = %zone_code, "Login gate called without an authenticated user");
            return Ok(denied(AccessLevel::Default));
        }

        let zone = match self.store.get_zone_by_code(zone_code).await? {
            Some(zone) if zone.enabled => zone,
            Some(_) => return Ok(denied(AccessLevel::Denied)),
            None => return Ok(denied(AccessLevel::Default)),
        };

        let access = AccessMatrix::resolve(self.store.as_ref(), &zone, user)
            .await?
            .access();
        if access != AccessLevel::Allowed {
            debug!(zone = %zone_code, user = %user.cache_id(), access = %access, "Login refused");
            return Ok(denied(access));
        }

        let audit = AuditOutcome::from_result(
            self.audit
                .record(Some(zone.id), zone_code, user, Action::Login, LOGIN_MESSAGE, "")
                .await,
        );
        Ok(LoginOutcome {
            allowed: true,
            access,
            audit,
        })
    }

    /// Record that `user` left the zone
    pub async fn process_logout(&self, zone_code: &str, user: &UserRef) -> Result<AuditOutcome> {
        let zone_id = self
            .store
            .get_zone_by_code(zone_code)
            .await?
            .map(|zone| zone.id);
        Ok(AuditOutcome::from_result(
            self.audit
                .record(
                    zone_id,
                    zone_code,
                    user,
                    Action::Logout,
                    audit_message(Action::Logout),
                    "",
                )
                .await,
        ))
    }

    /// Zone lookup and fold, without caching or logging
    pub(crate) async fn evaluate(
        &self,
        zone_code: &str,
        user: &UserRef,
    ) -> Result<(Option<ZoneId>, Verdict)> {
        let Some(zone) = self.store.get_zone_by_code(zone_code).await? else {
            return Ok((None, Verdict::ZoneUnknown));
        };
        if !zone.enabled {
            return Ok((Some(zone.id), Verdict::ZoneDisabled));
        }
        let matrix = AccessMatrix::resolve(self.store.as_ref(), &zone, user).await?;
        Ok((Some(zone.id), Verdict::Folded(matrix.access())))
    }

    async fn log_decision(
        &self,
        zone: Option<ZoneId>,
        zone_code: &str,
        user: &UserRef,
        action: Action,
        extra_data: &str,
    ) -> Result<AuditOutcome> {
        let is_grant = action == Action::Access;
        if is_grant
            && self
                .cache
                .grant_recently_logged(zone_code, user.cache_id())
                .await?
        {
            return Ok(AuditOutcome::skipped());
        }
        let outcome = AuditOutcome::from_result(
            self.audit
                .record(
                    zone,
                    zone_code,
                    user,
                    action,
                    audit_message(action),
                    extra_data,
                )
                .await,
        );
        // Only a written grant opens the debounce window.
        if is_grant && outcome.is_logged() {
            self.cache
                .mark_grant_logged(zone_code, user.cache_id())
                .await?;
        }
        Ok(outcome)
    }
}

impl std::fmt::Debug for ZoneAccessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneAccessEngine")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
