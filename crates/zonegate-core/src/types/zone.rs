//! Zones and the rules that override their default access

use super::{AccessLevel, GroupId, RuleId, UserId, ZoneId};
use crate::errors::{Result, ZoneGateError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a zone code
pub const MAX_ZONE_CODE_LEN: usize = 128;

/// Order assigned to rules created without an explicit one
pub const DEFAULT_RULE_ORDER: i32 = 10;

/// Unique slug used by the upstream proxy to name a zone
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZoneCode(String);

impl ZoneCode {
    /// Validate and wrap a zone code
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.is_empty() {
            return Err(ZoneGateError::invalid("Zone code must not be empty"));
        }
        if code.len() > MAX_ZONE_CODE_LEN {
            return Err(ZoneGateError::invalid(format!(
                "Zone code longer than {MAX_ZONE_CODE_LEN} characters"
            )));
        }
        if let Some(bad) = code
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ZoneGateError::invalid(format!(
                "Zone code '{code}' contains invalid character '{bad}'"
            )));
        }
        Ok(Self(code))
    }

    /// Borrow the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ZoneCode {
    type Error = ZoneGateError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ZoneCode> for String {
    fn from(code: ZoneCode) -> Self {
        code.0
    }
}

/// A named protected area with its own default access policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Record identifier
    pub id: ZoneId,
    /// Display name
    pub name: String,
    /// Unique lookup key
    pub code: ZoneCode,
    /// Access used before any rule is applied
    pub default_access: AccessLevel,
    /// Disabled zones deny everyone regardless of rules
    pub enabled: bool,
}

impl Zone {
    /// Create an enabled zone
    pub fn new(
        id: ZoneId,
        name: impl Into<String>,
        code: ZoneCode,
        default_access: AccessLevel,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            code,
            default_access,
            enabled: true,
        }
    }

    /// Builder-style toggle for the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Who a rule applies to. Only a reference, never ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum RuleSubject {
    /// A single directory user
    User(UserId),
    /// Every member of a directory group
    Group(GroupId),
}

impl RuleSubject {
    /// Short label for the subject kind
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Group(_) => "group",
        }
    }
}

impl fmt::Display for RuleSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Group(id) => write!(f, "group:{id}"),
        }
    }
}

/// Per-user or per-group override of a zone's access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRule {
    /// Record identifier
    pub id: RuleId,
    /// Owning zone
    pub zone: ZoneId,
    /// User or group the rule targets
    pub subject: RuleSubject,
    /// Access applied when the rule matches
    pub access: AccessLevel,
    /// Lower sorts first; later rules win
    pub order: i32,
}

impl ZoneRule {
    /// Rule targeting a single user
    pub fn user(id: RuleId, zone: ZoneId, user: UserId, access: AccessLevel, order: i32) -> Self {
        Self {
            id,
            zone,
            subject: RuleSubject::User(user),
            access,
            order,
        }
    }

    /// Rule targeting every member of a group
    pub fn group(
        id: RuleId,
        zone: ZoneId,
        group: GroupId,
        access: AccessLevel,
        order: i32,
    ) -> Self {
        Self {
            id,
            zone,
            subject: RuleSubject::Group(group),
            access,
            order,
        }
    }

    /// Whether this is a group rule
    pub fn is_group_rule(&self) -> bool {
        matches!(self.subject, RuleSubject::Group(_))
    }
}
