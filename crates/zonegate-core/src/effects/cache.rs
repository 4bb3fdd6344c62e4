//! Shared key-value cache with per-key expiry

use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Atomic get / set-with-TTL over opaque values
///
/// No compare-and-swap is offered. Two requests computing the same key
/// concurrently both write; the last write wins.
#[async_trait]
pub trait CacheEffects: Send + Sync {
    /// Fetch a live value; expired entries read as `None`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a value that expires after `ttl`
    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
}

#[async_trait]
impl<T: CacheEffects + ?Sized> CacheEffects for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        (**self).set_with_ttl(key, value, ttl).await
    }
}
