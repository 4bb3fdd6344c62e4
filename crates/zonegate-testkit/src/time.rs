//! Controllable clock for deterministic TTL tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use zonegate_core::effects::ClockEffects;

/// Clock that only moves when a test advances it
#[derive(Debug, Clone)]
pub struct ControllableClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ControllableClock {
    /// Clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Current time without going through the effect trait
    pub fn current(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap()
    }

    /// Move forward by whole seconds
    pub fn advance_secs(&self, seconds: i64) {
        let mut current = self.current.lock().unwrap();
        *current += Duration::seconds(seconds);
    }

    /// Jump to an absolute time
    pub fn set(&self, time: DateTime<Utc>) {
        *self.current.lock().unwrap() = time;
    }
}

impl Default for ControllableClock {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }
}

#[async_trait]
impl ClockEffects for ControllableClock {
    async fn now(&self) -> DateTime<Utc> {
        self.current()
    }
}
