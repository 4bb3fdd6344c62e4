//! Numeric identifiers for persisted records

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create an identifier from its raw value
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Raw numeric value
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a protected zone
    ZoneId
);
numeric_id!(
    /// Identifier of a per-user or per-group rule
    RuleId
);
numeric_id!(
    /// Identifier of a directory user
    UserId
);
numeric_id!(
    /// Identifier of a directory group
    GroupId
);
numeric_id!(
    /// Identifier assigned to an appended audit log entry
    LogEntryId
);

impl UserId {
    /// Sentinel id used for unauthenticated subjects in cache keys and logs
    pub const ANONYMOUS: UserId = UserId(0);
}
