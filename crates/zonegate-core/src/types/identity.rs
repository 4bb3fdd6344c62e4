//! Subjects of an access request

use super::UserId;
use serde::{Deserialize, Serialize};

/// Username recorded for unauthenticated subjects
pub const ANONYMOUS_USERNAME: &str = "<ANONYMOUS>";

/// Directory attributes of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Directory identifier
    pub id: UserId,
    /// Login name
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
}

impl UserProfile {
    /// Profile with only the mandatory fields set
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    /// Builder-style email setter
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Builder-style name setter
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }
}

/// The acting subject of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserRef {
    /// No session, or the session did not resolve
    Anonymous,
    /// Known user with the session that identified it
    Authenticated {
        /// Directory profile
        profile: UserProfile,
        /// Session identifier, when the subject came from a session
        #[serde(default)]
        session: Option<String>,
    },
}

impl UserRef {
    /// Authenticated subject without a session identifier
    pub fn authenticated(profile: UserProfile) -> Self {
        Self::Authenticated {
            profile,
            session: None,
        }
    }

    /// Authenticated subject identified by a session
    pub fn with_session(profile: UserProfile, session: impl Into<String>) -> Self {
        Self::Authenticated {
            profile,
            session: Some(session.into()),
        }
    }

    /// Whether the subject is logged in
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Directory profile, if authenticated
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { profile, .. } => Some(profile),
        }
    }

    /// Directory id, if authenticated
    pub fn user_id(&self) -> Option<UserId> {
        self.profile().map(|p| p.id)
    }

    /// Id used as the cache-key component; anonymous maps to the sentinel
    pub fn cache_id(&self) -> UserId {
        self.user_id().unwrap_or(UserId::ANONYMOUS)
    }

    /// Username as it should be written to the audit log
    pub fn username(&self) -> &str {
        self.profile()
            .map(|p| p.username.as_str())
            .unwrap_or(ANONYMOUS_USERNAME)
    }

    /// Session identifier, if any
    pub fn session(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { session, .. } => session.as_deref(),
        }
    }
}
