//! Effect trait definitions
//!
//! Pure trait definitions for every side effect the decision engine performs.
//! This module defines **what** the collaborators can do; handlers in
//! `zonegate-effects` (production) and `zonegate-testkit` (testing) define
//! **how**.
//!
//! - **RuleStore**: zones, rules and group memberships (read-only)
//! - **Cache**: shared key-value store with per-key TTL
//! - **AuditStore**: append-only audit trail
//! - **Clock**: wall-clock time for log timestamps and TTL expiry
//! - **Identity**: session lookup used by the boundary layer

pub mod audit;
pub mod cache;
pub mod identity;
pub mod rule_store;
pub mod time;

pub use audit::AuditStoreEffects;
pub use cache::CacheEffects;
pub use identity::IdentityEffects;
pub use rule_store::RuleStoreEffects;
pub use time::ClockEffects;
