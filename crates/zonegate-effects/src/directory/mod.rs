//! In-memory directory and rule store
//!
//! Holds zones, rules, users, group memberships and session tokens. Used by
//! the server when the directory is provided as a seed file, and by tests.

mod seed;

pub use seed::{DirectorySeed, GroupSeed, RuleSeed, UserSeed, ZoneSeed};

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use zonegate_core::effects::{IdentityEffects, RuleStoreEffects};
use zonegate_core::{
    GroupId, Result, RuleId, UserId, UserProfile, Zone, ZoneGateError, ZoneId, ZoneRule,
};

/// Plain directory contents, mutated under the handler's lock
#[derive(Debug, Default, Clone)]
pub struct DirectoryState {
    zones: HashMap<ZoneId, Zone>,
    codes: BTreeMap<String, ZoneId>,
    rules: Vec<ZoneRule>,
    users: HashMap<UserId, UserProfile>,
    memberships: HashMap<UserId, Vec<GroupId>>,
    sessions: HashMap<String, UserId>,
}

impl DirectoryState {
    /// Add a zone; ids and codes must be unique
    pub fn insert_zone(&mut self, zone: Zone) -> Result<()> {
        if self.zones.contains_key(&zone.id) {
            return Err(ZoneGateError::invalid(format!(
                "Zone id {} already exists",
                zone.id
            )));
        }
        if self.codes.contains_key(zone.code.as_str()) {
            return Err(ZoneGateError::invalid(format!(
                "Zone code '{}' already exists",
                zone.code
            )));
        }
        self.codes.insert(zone.code.to_string(), zone.id);
        self.zones.insert(zone.id, zone);
        Ok(())
    }

    /// Add a rule to an existing zone
    pub fn insert_rule(&mut self, rule: ZoneRule) -> Result<()> {
        if !self.zones.contains_key(&rule.zone) {
            return Err(ZoneGateError::not_found(format!(
                "Rule {} references unknown zone {}",
                rule.id, rule.zone
            )));
        }
        if self.rules.iter().any(|existing| existing.id == rule.id) {
            return Err(ZoneGateError::invalid(format!(
                "Rule id {} already exists",
                rule.id
            )));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Add or replace a user together with its group memberships
    pub fn insert_user(&mut self, profile: UserProfile, groups: Vec<GroupId>) {
        self.memberships.insert(profile.id, groups);
        self.users.insert(profile.id, profile);
    }

    /// Bind a session token to an existing user
    pub fn insert_session(&mut self, token: impl Into<String>, user: UserId) -> Result<()> {
        if !self.users.contains_key(&user) {
            return Err(ZoneGateError::not_found(format!("Unknown user {user}")));
        }
        self.sessions.insert(token.into(), user);
        Ok(())
    }

    /// Switch a zone on or off; the code itself never changes
    pub fn set_zone_enabled(&mut self, code: &str, enabled: bool) -> Result<()> {
        let id = self
            .codes
            .get(code)
            .ok_or_else(|| ZoneGateError::not_found(format!("Unknown zone: {code}")))?;
        if let Some(zone) = self.zones.get_mut(id) {
            zone.enabled = enabled;
        }
        Ok(())
    }

    /// Next free rule id
    pub fn next_rule_id(&self) -> RuleId {
        RuleId(self.rules.iter().map(|r| r.id.value()).max().unwrap_or(0) + 1)
    }

    fn zone_by_code(&self, code: &str) -> Option<Zone> {
        self.codes
            .get(code)
            .and_then(|id| self.zones.get(id))
            .cloned()
    }

    fn rules_for(&self, zone: ZoneId, groups: bool) -> Vec<ZoneRule> {
        self.rules
            .iter()
            .filter(|rule| rule.zone == zone && rule.is_group_rule() == groups)
            .cloned()
            .collect()
    }
}

/// Shared handle over a [`DirectoryState`]
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl MemoryDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding a prepared state
    pub fn from_state(state: DirectoryState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Directory built from a seed document
    pub fn from_seed(seed: DirectorySeed) -> Result<Self> {
        Ok(Self::from_state(seed.into_state()?))
    }

    /// Add a zone
    pub async fn insert_zone(&self, zone: Zone) -> Result<()> {
        self.state.write().await.insert_zone(zone)
    }

    /// Add a rule
    pub async fn insert_rule(&self, rule: ZoneRule) -> Result<()> {
        self.state.write().await.insert_rule(rule)
    }

    /// Add a user and its memberships
    pub async fn insert_user(&self, profile: UserProfile, groups: Vec<GroupId>) {
        self.state.write().await.insert_user(profile, groups);
    }

    /// Bind a session token
    pub async fn insert_session(&self, token: impl Into<String>, user: UserId) -> Result<()> {
        self.state.write().await.insert_session(token, user)
    }

    /// Switch a zone on or off
    pub async fn set_zone_enabled(&self, code: &str, enabled: bool) -> Result<()> {
        self.state.write().await.set_zone_enabled(code, enabled)
    }

    /// Replace the whole directory, e.g. after reloading the seed file
    pub async fn replace(&self, state: DirectoryState) {
        *self.state.write().await = state;
    }
}

#[async_trait]
impl RuleStoreEffects for MemoryDirectory {
    async fn get_zone_by_code(&self, code: &str) -> Result<Option<Zone>> {
        Ok(self.state.read().await.zone_by_code(code))
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let state = self.state.read().await;
        Ok(state
            .codes
            .values()
            .filter_map(|id| state.zones.get(id).cloned())
            .collect())
    }

    async fn list_group_rules(&self, zone: &Zone) -> Result<Vec<ZoneRule>> {
        Ok(self.state.read().await.rules_for(zone.id, true))
    }

    async fn list_user_rules(&self, zone: &Zone) -> Result<Vec<ZoneRule>> {
        Ok(self.state.read().await.rules_for(zone.id, false))
    }

    async fn get_user_groups(&self, user: UserId) -> Result<Vec<GroupId>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl IdentityEffects for MemoryDirectory {
    async fn resolve_session(&self, token: &str) -> Result<Option<UserProfile>> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .get(token)
            .and_then(|id| state.users.get(id))
            .cloned())
    }
}
