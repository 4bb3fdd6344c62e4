//! Access matrix resolution
//!
//! The matrix of a (zone, user) pair is the zone's default access plus every
//! group rule matching one of the user's groups and every user rule naming the
//! user. Folding walks the rules in ascending `order` and lets each
//! non-DEFAULT rule overwrite the running access, so the last applicable rule
//! wins regardless of whether it targets a user or a group.

use serde::{Deserialize, Serialize};
use tracing::debug;
use zonegate_core::effects::RuleStoreEffects;
use zonegate_core::{AccessLevel, Result, RuleSubject, UserId, UserRef, Zone, ZoneRule};

/// Fold rules over a base access level
///
/// Rules are stably sorted by `order`, so rules sharing an order keep the
/// position they had in `rules`.
pub fn fold_rules<'a, I>(base: AccessLevel, rules: I) -> AccessLevel
where
    I: IntoIterator<Item = &'a ZoneRule>,
{
    let mut sorted: Vec<&ZoneRule> = rules.into_iter().collect();
    sorted.sort_by_key(|rule| rule.order);

    let mut access = base;
    for rule in sorted {
        if rule.access.is_override() {
            access = rule.access;
        }
        debug!(
            order = rule.order,
            subject = %rule.subject,
            rule_access = %rule.access,
            access = %access,
            "Applied zone rule"
        );
    }
    access
}

/// Counts and results reported for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSummary {
    /// Zone default before any rule
    pub base_access: AccessLevel,
    /// Group rules matching the user's groups
    pub group_rule_count: usize,
    /// User rules naming the user
    pub user_rule_count: usize,
    /// Fold over all matching rules
    pub access: AccessLevel,
}

/// Materialized rules of a zone for one subject
#[derive(Debug, Clone)]
pub struct AccessMatrix {
    zone: Zone,
    user: UserId,
    group_rules: Vec<ZoneRule>,
    user_rules: Vec<ZoneRule>,
}

impl AccessMatrix {
    /// Assemble a matrix from already selected rules
    pub fn new(
        zone: Zone,
        user: UserId,
        group_rules: Vec<ZoneRule>,
        user_rules: Vec<ZoneRule>,
    ) -> Self {
        Self {
            zone,
            user,
            group_rules,
            user_rules,
        }
    }

    /// Matrix for an anonymous subject: no rules ever match
    pub fn anonymous(zone: Zone) -> Self {
        Self::new(zone, UserId::ANONYMOUS, Vec::new(), Vec::new())
    }

    /// Fetch the rules of `zone` that apply to `user`
    ///
    /// Anonymous subjects skip the directory entirely.
    pub async fn resolve<S>(store: &S, zone: &Zone, user: &UserRef) -> Result<Self>
    where
        S: RuleStoreEffects + ?Sized,
    {
        let user_id = match user.user_id() {
            Some(id) => id,
            None => return Ok(Self::anonymous(zone.clone())),
        };

        let groups = store.get_user_groups(user_id).await?;
        let group_rules = store
            .list_group_rules(zone)
            .await?
            .into_iter()
            .filter(|rule| matches!(rule.subject, RuleSubject::Group(g) if groups.contains(&g)))
            .collect();
        let user_rules = store
            .list_user_rules(zone)
            .await?
            .into_iter()
            .filter(|rule| rule.subject == RuleSubject::User(user_id))
            .collect();

        Ok(Self::new(zone.clone(), user_id, group_rules, user_rules))
    }

    /// Zone the matrix was built for
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Subject id (sentinel for anonymous)
    pub fn user(&self) -> UserId {
        self.user
    }

    /// Matching group rules
    pub fn group_rules(&self) -> &[ZoneRule] {
        &self.group_rules
    }

    /// Matching user rules
    pub fn user_rules(&self) -> &[ZoneRule] {
        &self.user_rules
    }

    /// Group rules followed by user rules, before sorting
    pub fn rules(&self) -> impl Iterator<Item = &ZoneRule> {
        self.group_rules.iter().chain(self.user_rules.iter())
    }

    /// Effective access over every matching rule
    pub fn access(&self) -> AccessLevel {
        debug!(
            zone = %self.zone.code,
            user = %self.user,
            base = %self.zone.default_access,
            "Folding access matrix"
        );
        fold_rules(self.zone.default_access, self.rules())
    }

    /// Access considering only group rules
    pub fn allowed_by_group(&self) -> AccessLevel {
        fold_rules(self.zone.default_access, &self.group_rules)
    }

    /// Access considering only user rules
    pub fn allowed_by_user(&self) -> AccessLevel {
        fold_rules(self.zone.default_access, &self.user_rules)
    }

    /// Diagnostic summary of the fold
    pub fn summary(&self) -> MatrixSummary {
        MatrixSummary {
            base_access: self.zone.default_access,
            group_rule_count: self.group_rules.len(),
            user_rule_count: self.user_rules.len(),
            access: self.access(),
        }
    }
}
