//! TOML seed documents for the in-memory directory
//!
//! ```toml
//! [[groups]]
//! id = 1
//! name = "staff"
//!
//! [[users]]
//! id = 7
//! username = "alice"
//! email = "alice@example.org"
//! groups = ["staff"]
//! sessions = ["alice-session"]
//!
//! [[zones]]
//! id = 1
//! name = "Wiki"
//! code = "wiki"
//! default_access = "denied"
//!
//! [[zones.rules]]
//! group = "staff"
//! access = "allowed"
//! order = 10
//! ```

use super::DirectoryState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use zonegate_core::{
    AccessLevel, GroupId, Result, RuleId, UserId, UserProfile, Zone, ZoneCode, ZoneGateError,
    ZoneId, ZoneRule, DEFAULT_RULE_ORDER,
};

fn default_enabled() -> bool {
    true
}

fn default_order() -> i32 {
    DEFAULT_RULE_ORDER
}

/// Whole directory document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySeed {
    /// Directory groups
    pub groups: Vec<GroupSeed>,
    /// Directory users
    pub users: Vec<UserSeed>,
    /// Zones with their rules
    pub zones: Vec<ZoneSeed>,
}

/// Group entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSeed {
    /// Group id
    pub id: u64,
    /// Unique group name referenced by users and rules
    pub name: String,
}

/// User entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSeed {
    /// User id (must not be 0)
    pub id: u64,
    /// Unique login name referenced by rules
    pub username: String,
    /// Contact address
    #[serde(default)]
    pub email: String,
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Names of the groups the user belongs to
    #[serde(default)]
    pub groups: Vec<String>,
    /// Session tokens that identify the user
    #[serde(default)]
    pub sessions: Vec<String>,
}

/// Zone entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSeed {
    /// Zone id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Unique slug
    pub code: String,
    /// Access before rules are applied
    #[serde(default)]
    pub default_access: AccessLevel,
    /// Defaults to enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Rules in stored order
    #[serde(default)]
    pub rules: Vec<RuleSeed>,
}

/// Rule entry; exactly one of `user` / `group` must be set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSeed {
    /// Username the rule targets
    #[serde(default)]
    pub user: Option<String>,
    /// Group name the rule targets
    #[serde(default)]
    pub group: Option<String>,
    /// Access applied when the rule matches
    #[serde(default)]
    pub access: AccessLevel,
    /// Fold position, lower first
    #[serde(default = "default_order")]
    pub order: i32,
}

impl DirectorySeed {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ZoneGateError::storage(format!(
                "Failed to read directory file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve names into ids and build the directory contents
    pub fn into_state(self) -> Result<DirectoryState> {
        let mut state = DirectoryState::default();

        let mut groups = HashMap::new();
        for group in &self.groups {
            if groups
                .insert(group.name.clone(), GroupId(group.id))
                .is_some()
            {
                return Err(ZoneGateError::invalid(format!(
                    "Duplicate group name '{}'",
                    group.name
                )));
            }
        }

        let mut users = HashMap::new();
        for user in self.users {
            if user.id == UserId::ANONYMOUS.value() {
                return Err(ZoneGateError::invalid(format!(
                    "User '{}' uses the reserved id 0",
                    user.username
                )));
            }
            let id = UserId(user.id);
            if users.insert(user.username.clone(), id).is_some() {
                return Err(ZoneGateError::invalid(format!(
                    "Duplicate username '{}'",
                    user.username
                )));
            }
            let memberships = user
                .groups
                .iter()
                .map(|name| lookup(&groups, name, "group"))
                .collect::<Result<Vec<_>>>()?;
            let profile = UserProfile {
                id,
                username: user.username,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
            };
            state.insert_user(profile, memberships);
            for token in user.sessions {
                state.insert_session(token, id)?;
            }
        }

        let mut next_rule = 1;
        for seed in self.zones {
            let zone_id = ZoneId(seed.id);
            let zone = Zone::new(
                zone_id,
                seed.name,
                ZoneCode::new(seed.code)?,
                seed.default_access,
            )
            .with_enabled(seed.enabled);
            state.insert_zone(zone)?;

            for rule in seed.rules {
                let id = RuleId(next_rule);
                next_rule += 1;
                let rule = match (rule.user, rule.group) {
                    (Some(user), None) => ZoneRule::user(
                        id,
                        zone_id,
                        lookup(&users, &user, "user")?,
                        rule.access,
                        rule.order,
                    ),
                    (None, Some(group)) => ZoneRule::group(
                        id,
                        zone_id,
                        lookup(&groups, &group, "group")?,
                        rule.access,
                        rule.order,
                    ),
                    _ => {
                        return Err(ZoneGateError::invalid(format!(
                            "Rule {id} of zone {zone_id} must name exactly one user or group"
                        )))
                    }
                };
                state.insert_rule(rule)?;
            }
        }

        Ok(state)
    }
}

fn lookup<T: Copy>(names: &HashMap<String, T>, name: &str, kind: &str) -> Result<T> {
    names
        .get(name)
        .copied()
        .ok_or_else(|| ZoneGateError::not_found(format!("Unknown {kind} '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SEED: &str = r#"
[[groups]]
id = 1
name = "staff"

[[users]]
id = 7
username = "alice"
email = "alice@example.org"
groups = ["staff"]
sessions = ["alice-session"]

[[zones]]
id = 1
name = "Wiki"
code = "wiki"
default_access = "denied"

[[zones.rules]]
group = "staff"
access = "allowed"

[[zones.rules]]
user = "alice"
access = "denied"
order = 20

[[zones]]
id = 2
name = "Legacy"
code = "legacy"
enabled = false
"#;

    #[test]
    fn parses_and_resolves_names() {
        let state = DirectorySeed::from_toml_str(SEED)
            .unwrap()
            .into_state()
            .unwrap();

        let wiki = state.zone_by_code("wiki").unwrap();
        assert_eq!(wiki.default_access, AccessLevel::Denied);
        assert!(wiki.enabled);
        assert!(!state.zone_by_code("legacy").unwrap().enabled);

        let groups = state.rules_for(wiki.id, true);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].order, DEFAULT_RULE_ORDER);
        let users = state.rules_for(wiki.id, false);
        assert_eq!(users[0].order, 20);
        assert_eq!(users[0].access, AccessLevel::Denied);

        assert_eq!(state.sessions.get("alice-session"), Some(&UserId(7)));
        assert_eq!(state.memberships.get(&UserId(7)), Some(&vec![GroupId(1)]));
    }

    #[test]
    fn unknown_group_reference_fails() {
        let seed = r#"
[[users]]
id = 3
username = "bob"
groups = ["ghosts"]
"#;
        let result = DirectorySeed::from_toml_str(seed).unwrap().into_state();
        assert_matches!(result, Err(ZoneGateError::NotFound { .. }));
    }

    #[test]
    fn rule_needs_exactly_one_subject() {
        let seed = r#"
[[zones]]
id = 1
name = "Wiki"
code = "wiki"

[[zones.rules]]
access = "allowed"
"#;
        let result = DirectorySeed::from_toml_str(seed).unwrap().into_state();
        assert_matches!(result, Err(ZoneGateError::Invalid { .. }));
    }

    #[test]
    fn reserved_user_id_is_rejected() {
        let seed = r#"
[[users]]
id = 0
username = "root"
"#;
        let result = DirectorySeed::from_toml_str(seed).unwrap().into_state();
        assert_matches!(result, Err(ZoneGateError::Invalid { .. }));
    }

    #[test]
    fn invalid_zone_code_fails() {
        let seed = r#"
[[zones]]
id = 1
name = "Bad"
code = "not a slug"
"#;
        let result = DirectorySeed::from_toml_str(seed).unwrap().into_state();
        assert!(result.is_err());
    }
}
