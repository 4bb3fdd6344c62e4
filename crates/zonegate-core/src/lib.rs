//! Zonegate Core
//!
//! Layer 1 of the zone access gateway: domain types, the unified error type,
//! engine configuration and the effect traits every collaborator implements.
//!
//! Nothing in this crate performs I/O. Handlers live in `zonegate-effects`,
//! decision logic in `zonegate-authorization`.

pub mod config;
pub mod effects;
pub mod errors;
pub mod types;

pub use config::ZoneAccessConfig;
pub use errors::{Result, ZoneGateError};
pub use types::*;
