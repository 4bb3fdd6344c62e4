//! Access levels and externally observable actions

use crate::errors::ZoneGateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level attached to a zone default or a rule
///
/// `Default` on a rule is inert: it keeps whatever access was in effect.
/// `Default` as a fold result means "nothing decided" and is replaced by the
/// configured default response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Defer to the surrounding policy
    #[default]
    Default,
    /// Explicitly allowed
    Allowed,
    /// Explicitly denied
    Denied,
}

impl AccessLevel {
    /// Persisted numeric code
    pub const fn code(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Allowed => 1,
            Self::Denied => 2,
        }
    }

    /// Create from a persisted numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Default),
            1 => Some(Self::Allowed),
            2 => Some(Self::Denied),
            _ => None,
        }
    }

    /// Human readable label used in logs and reports
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Allowed => "Allowed",
            Self::Denied => "Denied",
        }
    }

    /// Whether this level overrides the running verdict when folded
    pub const fn is_override(self) -> bool {
        !matches!(self, Self::Default)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AccessLevel {
    type Err = ZoneGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code)
                .ok_or_else(|| ZoneGateError::invalid(format!("Unknown access code: {code}")));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "allowed" | "allow" => Ok(Self::Allowed),
            "denied" | "deny" => Ok(Self::Denied),
            other => Err(ZoneGateError::invalid(format!(
                "Unknown access level: {other}"
            ))),
        }
    }
}

/// Terminal outcome of a single access evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Access granted
    Access,
    /// Subject must authenticate first (or completed a login)
    Login,
    /// Subject ended its session
    Logout,
    /// Authenticated subject denied
    AccessDenied,
    /// Zone exists but is switched off
    ZoneDisabled,
    /// No zone with the requested code
    ZoneUnknown,
}

impl Action {
    /// Stable wire code stored in the audit log
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::AccessDenied => "access_denied",
            Self::ZoneDisabled => "zone_disabled",
            Self::ZoneUnknown => "zone_unknown",
        }
    }

    /// Human readable label used in logs and reports
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Access => "Access Granted",
            Self::Login => "Login Required",
            Self::Logout => "Logout",
            Self::AccessDenied => "Access Denied",
            Self::ZoneDisabled => "Zone Disabled",
            Self::ZoneUnknown => "Zone Unknown",
        }
    }

    /// Whether the subject is let through
    pub const fn is_grant(self) -> bool {
        matches!(self, Self::Access)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_level_parses_names_and_codes() {
        assert_eq!("ALLOWED".parse::<AccessLevel>().unwrap(), AccessLevel::Allowed);
        assert_eq!(" denied ".parse::<AccessLevel>().unwrap(), AccessLevel::Denied);
        assert_eq!("0".parse::<AccessLevel>().unwrap(), AccessLevel::Default);
        assert_eq!("2".parse::<AccessLevel>().unwrap(), AccessLevel::Denied);
        assert!("3".parse::<AccessLevel>().is_err());
        assert!("maybe".parse::<AccessLevel>().is_err());
    }

    #[test]
    fn access_level_codes_round_trip() {
        for level in [AccessLevel::Default, AccessLevel::Allowed, AccessLevel::Denied] {
            assert_eq!(AccessLevel::from_code(level.code()), Some(level));
        }
    }

    #[test]
    fn only_default_is_inert() {
        assert!(!AccessLevel::Default.is_override());
        assert!(AccessLevel::Allowed.is_override());
        assert!(AccessLevel::Denied.is_override());
    }

    #[test]
    fn action_wire_codes() {
        assert_eq!(Action::AccessDenied.as_str(), "access_denied");
        assert_eq!(Action::ZoneUnknown.to_string(), "zone_unknown");
        let json = serde_json::to_string(&Action::ZoneDisabled).unwrap();
        assert_eq!(json, "\"zone_disabled\"");
        assert!(Action::Access.is_grant());
        assert!(!Action::Login.is_grant());
    }
}
