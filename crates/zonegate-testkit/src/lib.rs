//! Zonegate Testing Infrastructure
//!
//! Shared test setup for every crate in the workspace: a clock that only
//! moves when told to, handlers that count or fail their calls, and
//! fixtures for building directories.
//!
//! ```toml
//! [dev-dependencies]
//! zonegate-testkit = { path = "../zonegate-testkit" }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod fixtures;
pub mod mocks;
pub mod time;

pub use fixtures::*;
pub use mocks::*;
pub use time::ControllableClock;
