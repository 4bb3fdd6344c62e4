//! Session lookup for the boundary layer

use crate::errors::Result;
use crate::types::UserProfile;
use async_trait::async_trait;
use std::sync::Arc;

/// Maps an opaque session token to the user it belongs to
///
/// Issuing and expiring sessions is the identity provider's business; this
/// trait only answers "who is this".
#[async_trait]
pub trait IdentityEffects: Send + Sync {
    /// Resolve a session token, `None` when it is unknown
    async fn resolve_session(&self, token: &str) -> Result<Option<UserProfile>>;
}

#[async_trait]
impl<T: IdentityEffects + ?Sized> IdentityEffects for Arc<T> {
    async fn resolve_session(&self, token: &str) -> Result<Option<UserProfile>> {
        (**self).resolve_session(token).await
    }
}
