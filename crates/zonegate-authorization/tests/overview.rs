//! Per-zone access report

#![allow(clippy::unwrap_used)]

mod common;

use assert_matches::assert_matches;
use common::{config, Harness};
use zonegate_core::{AccessLevel, Action, UserRef, ZoneGateError};
use zonegate_testkit::{test_subject, test_user, DirectoryBuilder};

fn harness() -> Harness {
    let dir = DirectoryBuilder::new()
        .user(test_user(7, "alice"), &[1])
        .zone("wiki", AccessLevel::Denied)
        .zone("docs", AccessLevel::Default)
        .disabled_zone("legacy", AccessLevel::Allowed)
        .group_rule("wiki", 1, AccessLevel::Allowed, 10)
        .user_rule("wiki", 7, AccessLevel::Denied, 20)
        .build();
    Harness::new(dir, config(60, false, 0, AccessLevel::Allowed))
}

#[tokio::test]
async fn reports_every_zone_in_code_order() {
    let h = harness();
    let reports = h
        .engine
        .access_overview(&test_subject(7, "alice"), None)
        .await
        .unwrap();

    let codes: Vec<&str> = reports.iter().map(|r| r.zone_code.as_str()).collect();
    assert_eq!(codes, vec!["docs", "legacy", "wiki"]);

    let wiki = &reports[2];
    assert_eq!(wiki.matrix.group_rule_count, 1);
    assert_eq!(wiki.matrix.user_rule_count, 1);
    assert_eq!(wiki.group_access, AccessLevel::Allowed);
    assert_eq!(wiki.user_access, AccessLevel::Denied);
    assert_eq!(wiki.action, Action::AccessDenied);

    let docs = &reports[0];
    assert_eq!(docs.matrix.access, AccessLevel::Default);
    assert_eq!(docs.action, Action::Access);
    assert_eq!(docs.access, AccessLevel::Allowed);

    let legacy = &reports[1];
    assert!(!legacy.enabled);
    assert_eq!(legacy.action, Action::ZoneDisabled);
}

#[tokio::test]
async fn overview_has_no_side_effects() {
    let h = harness();
    h.engine
        .access_overview(&UserRef::Anonymous, None)
        .await
        .unwrap();

    assert!(h.entries().await.is_empty());
    assert_eq!(h.cache.gets(), 0);
    assert_eq!(h.cache.sets(), 0);
}

#[tokio::test]
async fn single_zone_report() {
    let h = harness();
    let reports = h
        .engine
        .access_overview(&UserRef::Anonymous, Some("wiki"))
        .await
        .unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].matrix.group_rule_count, 0);
    assert_eq!(reports[0].action, Action::Login);

    assert_matches!(
        h.engine.access_overview(&UserRef::Anonymous, Some("nowhere")).await,
        Err(ZoneGateError::NotFound { .. })
    );
}
