//! Zonegate Authorization
//!
//! The zone access decision engine. For every (zone, user) pair it:
//!
//! - folds the zone default and the matching user/group rules into an
//!   effective access level ([`matrix`])
//! - maps that level and the zone state onto a terminal action ([`decisions`])
//! - memoizes the result and debounces repeated grant logs ([`cache`])
//! - writes one audit record per decision ([`audit`])
//!
//! [`ZoneAccessEngine`] is the facade the boundary layer talks to.

pub mod audit;
pub mod cache;
pub mod decisions;
pub mod engine;
pub mod matrix;
pub mod overview;

pub use audit::AuditLogger;
pub use cache::{CachedDecision, DecisionCache};
pub use decisions::{audit_message, resolve_action, Decision, Verdict, LOGIN_MESSAGE};
pub use engine::{AccessOutcome, AuditOutcome, LoginOutcome, ZoneAccessEngine, CACHED_RESPONSE};
pub use matrix::{fold_rules, AccessMatrix, MatrixSummary};
pub use overview::ZoneAccessReport;
