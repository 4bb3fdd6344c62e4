//! Zonegate Effects
//!
//! Layer 3 handlers implementing the effect traits from `zonegate-core`:
//!
//! - [`MemoryDirectory`]: rule store and session lookup, seeded from TOML
//! - [`MemoryCacheHandler`]: per-process TTL cache
//! - [`MemoryAuditStore`] / [`JsonlAuditStore`]: audit trail backends
//! - [`RealClock`]: system time
//!
//! Failure-injecting and controllable handlers for tests live in
//! `zonegate-testkit`.

pub mod audit;
pub mod cache;
pub mod directory;
pub mod time;

pub use audit::{JsonlAuditStore, MemoryAuditStore};
pub use cache::MemoryCacheHandler;
pub use directory::{DirectorySeed, DirectoryState, MemoryDirectory};
pub use time::RealClock;
