// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::storage::MemoryStore;
use crate::test_helpers::FlakyStore;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

struct FixedClock(AtomicU64);

impl ClockSource for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn make_cache() -> (CacheStore, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock(AtomicU64::new(1_000)));
    let cache = CacheStore::with_clock(
        Arc::new(MemoryStore::new()),
        Namespace::default(),
        clock.clone(),
    );
    (cache, clock)
}

#[tokio::test]
async fn get_missing_is_none() {
    let (cache, _) = make_cache();
    assert!(cache.get("members").await.is_none());
}

#[tokio::test]
async fn put_then_get_returns_entry_with_timestamp() {
    let (cache, _) = make_cache();
    cache.put("members", json!([{"id": 1}])).await;

    let entry = cache.get("members").await.unwrap();
    assert_eq!(entry.key, "members");
    assert_eq!(entry.data, json!([{"id": 1}]));
    assert_eq!(entry.timestamp, 1_000);
}

#[tokio::test]
async fn put_overwrites_last_write_wins() {
    let (cache, clock) = make_cache();
    cache.put("events", json!("old")).await;
    clock.0.store(2_000, Ordering::SeqCst);
    cache.put("events", json!("new")).await;

    let entry = cache.get("events").await.unwrap();
    assert_eq!(entry.data, json!("new"));
    assert_eq!(entry.timestamp, 2_000);
    assert_eq!(cache.keys().await, vec!["events"]);
}

#[tokio::test]
async fn size_counts_serialized_entries() {
    let (cache, _) = make_cache();
    assert_eq!(cache.size_bytes().await, 0);

    let a = cache.put("a", json!({"x": 1})).await;
    let b = cache.put("b", json!("some longer text")).await;

    let expected = serde_json::to_string(&a).unwrap().len() + serde_json::to_string(&b).unwrap().len();
    assert_eq!(cache.size_bytes().await, expected as u64);
}

#[tokio::test]
async fn clear_all_removes_only_cache_keys() {
    let store = Arc::new(MemoryStore::new());
    let cache = CacheStore::new(store.clone(), Namespace::default());
    store
        .set("@clubsync/queue", "[]".to_string())
        .await
        .unwrap();

    cache.put("a", json!(1)).await;
    cache.put("b", json!(2)).await;

    assert_eq!(cache.clear_all().await.unwrap(), 2);
    assert!(cache.get("a").await.is_none());
    assert_eq!(cache.size_bytes().await, 0);
    assert!(store.get("@clubsync/queue").await.unwrap().is_some());
}

#[tokio::test]
async fn storage_failure_degrades_to_miss() {
    let store = Arc::new(FlakyStore::new());
    let cache = CacheStore::new(store.clone(), Namespace::default());
    cache.put("members", json!([1, 2])).await;

    store.set_failing(true);
    assert!(cache.get("members").await.is_none());
    assert_eq!(cache.size_bytes().await, 0);
    assert!(cache.keys().await.is_empty());

    // Failed write keeps the earlier entry
    cache.put("members", json!([3])).await;
    store.set_failing(false);
    assert_eq!(cache.get("members").await.unwrap().data, json!([1, 2]));
}

#[tokio::test]
async fn corrupt_entry_is_a_miss() {
    let store = Arc::new(MemoryStore::new());
    let ns = Namespace::default();
    store
        .set(&ns.cache_key("broken"), "{not json".to_string())
        .await
        .unwrap();

    let cache = CacheStore::new(store, ns);
    assert!(cache.get("broken").await.is_none());
}
