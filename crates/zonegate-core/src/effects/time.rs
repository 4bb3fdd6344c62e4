//! Wall-clock time

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of the current UTC time
#[async_trait]
pub trait ClockEffects: Send + Sync {
    /// Current wall-clock time
    async fn now(&self) -> DateTime<Utc>;
}

#[async_trait]
impl<T: ClockEffects + ?Sized> ClockEffects for Arc<T> {
    async fn now(&self) -> DateTime<Utc> {
        (**self).now().await
    }
}
