//! Integration tests for the TTL cache and audit store handlers

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use zonegate_core::effects::{AuditStoreEffects, CacheEffects};
use zonegate_core::{Action, NewLogEntry, UserId, ZoneGateError, ZoneId};
use zonegate_effects::{JsonlAuditStore, MemoryAuditStore, MemoryCacheHandler};
use zonegate_testkit::ControllableClock;

fn entry(clock: &ControllableClock, action: Action, message: &str) -> NewLogEntry {
    NewLogEntry {
        timestamp: clock.current(),
        zone: Some(ZoneId(1)),
        zone_code: "wiki".to_string(),
        user: Some(UserId(7)),
        username: "alice".to_string(),
        action,
        message: message.to_string(),
        extra_data: String::new(),
    }
}

#[tokio::test]
async fn cache_slot_expires_with_the_clock() {
    let clock = ControllableClock::default();
    let cache = MemoryCacheHandler::new(Arc::new(clock.clone()));

    cache
        .set_with_ttl("k", b"v".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));

    clock.advance_secs(59);
    assert!(cache.get("k").await.unwrap().is_some());

    clock.advance_secs(1);
    assert_eq!(cache.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn cache_overwrite_restarts_ttl() {
    let clock = ControllableClock::default();
    let cache = MemoryCacheHandler::new(Arc::new(clock.clone()));

    cache
        .set_with_ttl("k", b"old".to_vec(), Duration::from_secs(10))
        .await
        .unwrap();
    clock.advance_secs(8);
    cache
        .set_with_ttl("k", b"new".to_vec(), Duration::from_secs(10))
        .await
        .unwrap();
    clock.advance_secs(8);

    assert_eq!(cache.get("k").await.unwrap(), Some(b"new".to_vec()));
}

#[tokio::test]
async fn oversized_ttl_is_a_cache_error() {
    let cache = MemoryCacheHandler::new(Arc::new(ControllableClock::default()));

    assert_matches!(
        cache
            .set_with_ttl("k", vec![1], Duration::from_secs(10_000_000_000_000))
            .await,
        Err(ZoneGateError::Cache { .. })
    );
    assert_matches!(
        cache.set_with_ttl("k", vec![1], Duration::MAX).await,
        Err(ZoneGateError::Cache { .. })
    );
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn purge_drops_only_expired_slots() {
    let clock = ControllableClock::default();
    let cache = MemoryCacheHandler::new(Arc::new(clock.clone()));

    cache
        .set_with_ttl("short", vec![1], Duration::from_secs(5))
        .await
        .unwrap();
    cache
        .set_with_ttl("long", vec![2], Duration::from_secs(500))
        .await
        .unwrap();
    assert_eq!(cache.len().await, 2);

    clock.advance_secs(10);
    assert_eq!(cache.purge_expired().await, 1);
    assert_eq!(cache.len().await, 1);
    assert!(cache.get("long").await.unwrap().is_some());
}

#[tokio::test]
async fn memory_audit_ids_are_sequential_and_recent_is_newest_first() {
    let clock = ControllableClock::default();
    let store = MemoryAuditStore::new();

    for message in ["first", "second", "third"] {
        store
            .append(entry(&clock, Action::Access, message))
            .await
            .unwrap();
        clock.advance_secs(1);
    }

    let all = store.entries().await;
    let ids: Vec<u64> = all.iter().map(|e| e.id.value()).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let recent = store.recent(2).await.unwrap();
    let messages: Vec<&str> = recent.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["third", "second"]);
}

#[tokio::test]
async fn jsonl_store_appends_and_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let clock = ControllableClock::default();

    let store = JsonlAuditStore::open(&path).await.unwrap();
    assert!(store.recent(10).await.unwrap().is_empty());

    store
        .append(entry(&clock, Action::Access, "access granted"))
        .await
        .unwrap();
    clock.advance_secs(1);
    store
        .append(entry(&clock, Action::Logout, "user logged out"))
        .await
        .unwrap();

    let recent = store.recent(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].action, Action::Logout);
    assert_eq!(recent[1].action, Action::Access);

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[tokio::test]
async fn jsonl_store_resumes_ids_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let clock = ControllableClock::new(Utc::now());

    let first = JsonlAuditStore::open(&path).await.unwrap();
    first
        .append(entry(&clock, Action::Access, "one"))
        .await
        .unwrap();
    first
        .append(entry(&clock, Action::Access, "two"))
        .await
        .unwrap();

    let reopened = JsonlAuditStore::open(&path).await.unwrap();
    let id = reopened
        .append(entry(&clock, Action::Login, "three"))
        .await
        .unwrap();
    assert_eq!(id.value(), 3);
}

#[tokio::test]
async fn jsonl_store_skips_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let clock = ControllableClock::default();

    let store = JsonlAuditStore::open(&path).await.unwrap();
    store
        .append(entry(&clock, Action::Access, "kept"))
        .await
        .unwrap();

    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("{not json\n");
    std::fs::write(&path, content).unwrap();

    let recent = store.recent(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].message, "kept");
}
