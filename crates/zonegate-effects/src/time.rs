//! System clock handler

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use zonegate_core::effects::ClockEffects;

/// Real time handler for production use
///
/// Stateless; delegates to the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl RealClock {
    /// Create a new real clock
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClockEffects for RealClock {
    async fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
