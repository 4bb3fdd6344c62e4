//! Domain types shared across Zonegate crates

pub mod access;
pub mod identifiers;
pub mod identity;
pub mod log;
pub mod zone;

pub use access::{AccessLevel, Action};
pub use identifiers::{GroupId, LogEntryId, RuleId, UserId, ZoneId};
pub use identity::{UserProfile, UserRef, ANONYMOUS_USERNAME};
pub use log::{LogEntry, NewLogEntry};
pub use zone::{RuleSubject, Zone, ZoneCode, ZoneRule, DEFAULT_RULE_ORDER, MAX_ZONE_CODE_LEN};
