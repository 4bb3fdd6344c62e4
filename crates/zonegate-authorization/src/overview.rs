//! Read-only access reports
//!
//! Shows what the engine would decide for a user, zone by zone, together with
//! the matrix counts behind each decision. Reports bypass the decision cache
//! and never write to the audit log.

use crate::decisions::{resolve_action, Verdict};
use crate::engine::ZoneAccessEngine;
use crate::matrix::{AccessMatrix, MatrixSummary};
use serde::{Deserialize, Serialize};
use zonegate_core::{AccessLevel, Action, Result, UserRef, Zone, ZoneGateError};

/// What a user would get in one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAccessReport {
    /// Zone code
    pub zone_code: String,
    /// Zone display name
    pub zone_name: String,
    /// Whether the zone is enabled
    pub enabled: bool,
    /// Matrix counts and fold result
    pub matrix: MatrixSummary,
    /// Access considering only group rules
    pub group_access: AccessLevel,
    /// Access considering only user rules
    pub user_access: AccessLevel,
    /// Action the engine would take
    pub action: Action,
    /// Effective access the engine would report
    pub access: AccessLevel,
}

impl ZoneAccessEngine {
    /// Report for one zone, or for every zone when `zone_code` is `None`
    pub async fn access_overview(
        &self,
        user: &UserRef,
        zone_code: Option<&str>,
    ) -> Result<Vec<ZoneAccessReport>> {
        let zones = match zone_code {
            Some(code) => {
                let zone = self
                    .store()
                    .get_zone_by_code(code)
                    .await?
                    .ok_or_else(|| ZoneGateError::not_found(format!("Unknown zone: {code}")))?;
                vec![zone]
            }
            None => self.store().list_zones().await?,
        };

        let mut reports = Vec::with_capacity(zones.len());
        for zone in zones {
            reports.push(self.zone_report(zone, user).await?);
        }
        Ok(reports)
    }

    async fn zone_report(&self, zone: Zone, user: &UserRef) -> Result<ZoneAccessReport> {
        let matrix = AccessMatrix::resolve(self.store().as_ref(), &zone, user).await?;
        let summary = matrix.summary();
        let verdict = if zone.enabled {
            Verdict::Folded(summary.access)
        } else {
            Verdict::ZoneDisabled
        };
        let decision = resolve_action(
            verdict,
            user.is_authenticated(),
            self.config().default_response,
        );

        Ok(ZoneAccessReport {
            zone_code: zone.code.to_string(),
            zone_name: zone.name.clone(),
            enabled: zone.enabled,
            matrix: summary,
            group_access: matrix.allowed_by_group(),
            user_access: matrix.allowed_by_user(),
            action: decision.action,
            access: decision.access,
        })
    }
}
