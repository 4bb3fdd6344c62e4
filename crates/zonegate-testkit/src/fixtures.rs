//! Directory fixtures

use std::collections::HashMap;
use zonegate_core::{
    AccessLevel, GroupId, RuleId, UserId, UserProfile, UserRef, Zone, ZoneCode, ZoneId, ZoneRule,
};
use zonegate_effects::{DirectoryState, MemoryDirectory};

/// Profile with derived email and names
pub fn test_user(id: u64, username: &str) -> UserProfile {
    UserProfile::new(UserId(id), username)
        .with_email(format!("{username}@example.org"))
        .with_name(username, "Tester")
}

/// Authenticated subject for [`test_user`]
pub fn test_subject(id: u64, username: &str) -> UserRef {
    UserRef::authenticated(test_user(id, username))
}

/// Enabled zone whose display name mirrors its code
pub fn test_zone(id: u64, code: &str, default_access: AccessLevel) -> Zone {
    Zone::new(
        ZoneId(id),
        code.to_uppercase(),
        ZoneCode::new(code).expect("fixture zone code"),
        default_access,
    )
}

/// Fluent builder for a populated [`MemoryDirectory`]
///
/// Rule ids are assigned in insertion order.
#[derive(Debug, Default)]
pub struct DirectoryBuilder {
    state: DirectoryState,
    zones: HashMap<String, ZoneId>,
    next_zone: u64,
}

impl DirectoryBuilder {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an enabled zone
    pub fn zone(mut self, code: &str, default_access: AccessLevel) -> Self {
        self.next_zone += 1;
        let zone = test_zone(self.next_zone, code, default_access);
        self.zones.insert(code.to_string(), zone.id);
        self.state.insert_zone(zone).expect("fixture zone");
        self
    }

    /// Add a disabled zone
    pub fn disabled_zone(self, code: &str, default_access: AccessLevel) -> Self {
        let mut builder = self.zone(code, default_access);
        builder
            .state
            .set_zone_enabled(code, false)
            .expect("fixture zone exists");
        builder
    }

    /// Add a user belonging to `groups`
    pub fn user(mut self, profile: UserProfile, groups: &[u64]) -> Self {
        self.state
            .insert_user(profile, groups.iter().copied().map(GroupId).collect());
        self
    }

    /// Add a session token for an existing user
    pub fn session(mut self, token: &str, user: u64) -> Self {
        self.state
            .insert_session(token, UserId(user))
            .expect("fixture session user exists");
        self
    }

    /// Add a rule targeting a group
    pub fn group_rule(mut self, zone: &str, group: u64, access: AccessLevel, order: i32) -> Self {
        let rule = ZoneRule::group(
            self.rule_id(),
            self.zone_id(zone),
            GroupId(group),
            access,
            order,
        );
        self.state.insert_rule(rule).expect("fixture rule");
        self
    }

    /// Add a rule targeting a single user
    pub fn user_rule(mut self, zone: &str, user: u64, access: AccessLevel, order: i32) -> Self {
        let rule = ZoneRule::user(
            self.rule_id(),
            self.zone_id(zone),
            UserId(user),
            access,
            order,
        );
        self.state.insert_rule(rule).expect("fixture rule");
        self
    }

    /// Finish into raw state
    pub fn into_state(self) -> DirectoryState {
        self.state
    }

    /// Finish into a shared directory handler
    pub fn build(self) -> MemoryDirectory {
        MemoryDirectory::from_state(self.state)
    }

    fn rule_id(&self) -> RuleId {
        self.state.next_rule_id()
    }

    fn zone_id(&self, code: &str) -> ZoneId {
        *self
            .zones
            .get(code)
            .unwrap_or_else(|| panic!("fixture zone '{code}' not declared"))
    }
}
