//! Action resolution
//!
//! Maps the state of the requested zone and the folded access into exactly one
//! terminal [`Action`]. Precedence:
//!
//! 1. unknown zone → `ZoneUnknown` carrying the configured default response
//! 2. disabled zone → `ZoneDisabled`, access forced to DENIED
//! 3. enabled zone → fold result, DEFAULT replaced by the default response;
//!    ALLOWED grants, DENIED asks anonymous subjects to log in and denies
//!    everyone else

use serde::{Deserialize, Serialize};
use zonegate_core::{AccessLevel, Action};

/// What the rule store said about the requested zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No zone carries the requested code
    ZoneUnknown,
    /// The zone exists but is switched off
    ZoneDisabled,
    /// The zone is enabled; carries the raw fold result
    Folded(AccessLevel),
}

/// Outcome of a single evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Terminal action
    pub action: Action,
    /// Effective access after default substitution
    pub access: AccessLevel,
}

impl Decision {
    /// Pair an action with its effective access
    pub const fn new(action: Action, access: AccessLevel) -> Self {
        Self { action, access }
    }
}

/// Resolve a verdict into the action shown to the caller
pub fn resolve_action(
    verdict: Verdict,
    authenticated: bool,
    default_response: AccessLevel,
) -> Decision {
    match verdict {
        Verdict::ZoneUnknown => Decision::new(Action::ZoneUnknown, default_response),
        Verdict::ZoneDisabled => Decision::new(Action::ZoneDisabled, AccessLevel::Denied),
        Verdict::Folded(folded) => {
            let access = match folded {
                AccessLevel::Default => default_response,
                other => other,
            };
            match access {
                AccessLevel::Allowed => Decision::new(Action::Access, AccessLevel::Allowed),
                // A DEFAULT default response cannot grant anything.
                AccessLevel::Denied | AccessLevel::Default if authenticated => {
                    Decision::new(Action::AccessDenied, AccessLevel::Denied)
                }
                AccessLevel::Denied | AccessLevel::Default => {
                    Decision::new(Action::Login, AccessLevel::Denied)
                }
            }
        }
    }
}

/// Canned audit message for an action
pub const fn audit_message(action: Action) -> &'static str {
    match action {
        Action::Access => "user requested access",
        Action::Login => "user requires login",
        Action::Logout => "user logged out",
        Action::AccessDenied => "user denied access",
        Action::ZoneDisabled => "user requested access to a disabled zone",
        Action::ZoneUnknown => "user requested access to an unknown zone",
    }
}

/// Audit message for a completed interactive login
pub const LOGIN_MESSAGE: &str = "user logged in";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_zone_uses_default_response() {
        for default in [AccessLevel::Allowed, AccessLevel::Denied] {
            let decision = resolve_action(Verdict::ZoneUnknown, true, default);
            assert_eq!(decision, Decision::new(Action::ZoneUnknown, default));
        }
    }

    #[test]
    fn disabled_zone_is_always_denied() {
        for authenticated in [true, false] {
            let decision =
                resolve_action(Verdict::ZoneDisabled, authenticated, AccessLevel::Allowed);
            assert_eq!(
                decision,
                Decision::new(Action::ZoneDisabled, AccessLevel::Denied)
            );
        }
    }

    #[test]
    fn allowed_grants_access() {
        let decision = resolve_action(
            Verdict::Folded(AccessLevel::Allowed),
            false,
            AccessLevel::Denied,
        );
        assert_eq!(decision, Decision::new(Action::Access, AccessLevel::Allowed));
    }

    #[test]
    fn anonymous_denial_requires_login() {
        let decision = resolve_action(
            Verdict::Folded(AccessLevel::Denied),
            false,
            AccessLevel::Denied,
        );
        assert_eq!(decision, Decision::new(Action::Login, AccessLevel::Denied));
    }

    #[test]
    fn authenticated_denial_is_access_denied() {
        let decision = resolve_action(
            Verdict::Folded(AccessLevel::Denied),
            true,
            AccessLevel::Allowed,
        );
        assert_eq!(
            decision,
            Decision::new(Action::AccessDenied, AccessLevel::Denied)
        );
    }

    #[test]
    fn default_fold_takes_default_response() {
        let granted = resolve_action(
            Verdict::Folded(AccessLevel::Default),
            true,
            AccessLevel::Allowed,
        );
        assert_eq!(granted, Decision::new(Action::Access, AccessLevel::Allowed));

        let denied = resolve_action(
            Verdict::Folded(AccessLevel::Default),
            true,
            AccessLevel::Denied,
        );
        assert_eq!(
            denied,
            Decision::new(Action::AccessDenied, AccessLevel::Denied)
        );
    }

    #[test]
    fn unresolvable_default_fails_closed() {
        let decision = resolve_action(
            Verdict::Folded(AccessLevel::Default),
            false,
            AccessLevel::Default,
        );
        assert_eq!(decision, Decision::new(Action::Login, AccessLevel::Denied));
    }

    #[test]
    fn every_action_has_a_message() {
        for action in [
            Action::Access,
            Action::Login,
            Action::Logout,
            Action::AccessDenied,
            Action::ZoneDisabled,
            Action::ZoneUnknown,
        ] {
            assert!(!audit_message(action).is_empty());
        }
    }
}
