//! Read-only view over persisted zones, rules and group memberships

use crate::errors::Result;
use crate::types::{GroupId, UserId, Zone, ZoneRule};
use async_trait::async_trait;
use std::sync::Arc;

/// Rule store and directory lookups needed by the access matrix
///
/// Implementations report backend failures as `ZoneGateError::Storage`; a
/// missing zone is `Ok(None)`, not an error.
#[async_trait]
pub trait RuleStoreEffects: Send + Sync {
    /// Look a zone up by its unique code
    async fn get_zone_by_code(&self, code: &str) -> Result<Option<Zone>>;

    /// Every zone, ordered by code
    async fn list_zones(&self) -> Result<Vec<Zone>>;

    /// Group rules owned by the zone, in stored order
    async fn list_group_rules(&self, zone: &Zone) -> Result<Vec<ZoneRule>>;

    /// User rules owned by the zone, in stored order
    async fn list_user_rules(&self, zone: &Zone) -> Result<Vec<ZoneRule>>;

    /// Current group memberships of a user
    async fn get_user_groups(&self, user: UserId) -> Result<Vec<GroupId>>;
}

#[async_trait]
impl<T: RuleStoreEffects + ?Sized> RuleStoreEffects for Arc<T> {
    async fn get_zone_by_code(&self, code: &str) -> Result<Option<Zone>> {
        (**self).get_zone_by_code(code).await
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        (**self).list_zones().await
    }

    async fn list_group_rules(&self, zone: &Zone) -> Result<Vec<ZoneRule>> {
        (**self).list_group_rules(zone).await
    }

    async fn list_user_rules(&self, zone: &Zone) -> Result<Vec<ZoneRule>> {
        (**self).list_user_rules(zone).await
    }

    async fn get_user_groups(&self, user: UserId) -> Result<Vec<GroupId>> {
        (**self).get_user_groups(user).await
    }
}
