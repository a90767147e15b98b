// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the sync queue module.

#![allow(clippy::unwrap_used)]

use super::*;
use crate::storage::{MemoryStore, SqliteStore};
use crate::test_helpers::FlakyStore;
use serde_json::json;
use tempfile::tempdir;

fn make_queue() -> SyncQueue {
    SyncQueue::new(Arc::new(MemoryStore::new()), &Namespace::default())
}

#[tokio::test]
async fn empty_queue() {
    let queue = make_queue();
    assert!(queue.is_empty().await);
    assert!(queue.list().await.is_empty());
}

#[tokio::test]
async fn list_preserves_insertion_order() {
    let queue = make_queue();
    let a = queue.enqueue("members", Action::Create, json!({"n": 1})).await.unwrap();
    let b = queue.enqueue("members", Action::Update, json!({"n": 2})).await.unwrap();
    let c = queue.enqueue("events", Action::Delete, json!({"n": 3})).await.unwrap();

    let items = queue.list().await;
    let ids: Vec<_> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![a, b, c]);
    assert!(a < b && b < c);
    assert_eq!(items[1].action, Action::Update);
    assert!(items.iter().all(|i| i.retries == 0));
}

#[tokio::test]
async fn remove_deletes_only_target() {
    let queue = make_queue();
    let a = queue.enqueue("members", Action::Create, json!(1)).await.unwrap();
    let b = queue.enqueue("members", Action::Create, json!(2)).await.unwrap();

    assert!(queue.remove(a).await.unwrap());
    assert!(!queue.remove(a).await.unwrap());

    let ids: Vec<_> = queue.list().await.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![b]);
}

#[tokio::test]
async fn increment_retries_keeps_item_past_limit() {
    let queue = make_queue();
    let id = queue.enqueue("members", Action::Update, json!({})).await.unwrap();

    for expected in 1..=MAX_RETRIES + 1 {
        assert_eq!(queue.increment_retries(id).await.unwrap(), expected);
    }

    assert_eq!(queue.len().await, 1);
    assert!(queue.pending().await.is_empty());
    assert_eq!(queue.dead().await.len(), 1);
}

#[tokio::test]
async fn increment_missing_item_fails() {
    let queue = make_queue();
    let err = queue.increment_retries(QueueId::new(1, 0)).await.unwrap_err();
    assert!(matches!(err, Error::ItemNotFound(_)));
}

#[tokio::test]
async fn mark_dead_then_revive() {
    let queue = make_queue();
    let id = queue.enqueue("payments", Action::Create, json!({})).await.unwrap();

    queue.mark_dead(id).await.unwrap();
    assert_eq!(queue.dead().await[0].retries, MAX_RETRIES);

    queue.revive(id).await.unwrap();
    assert!(queue.dead().await.is_empty());
    assert_eq!(queue.pending().await[0].retries, 0);
}

#[tokio::test]
async fn discard_only_removes_dead_items() {
    let queue = make_queue();
    let live = queue.enqueue("members", Action::Create, json!({})).await.unwrap();
    let dead = queue.enqueue("members", Action::Update, json!({})).await.unwrap();
    queue.mark_dead(dead).await.unwrap();

    assert!(matches!(
        queue.discard(live).await,
        Err(Error::ItemNotDead(_))
    ));
    queue.discard(dead).await.unwrap();

    let ids: Vec<_> = queue.list().await.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![live]);
}

#[tokio::test]
async fn clear_all_empties_queue() {
    let queue = make_queue();
    queue.enqueue("a", Action::Create, json!(1)).await.unwrap();
    queue.enqueue("b", Action::Create, json!(2)).await.unwrap();

    assert_eq!(queue.clear_all().await.unwrap(), 2);
    assert!(queue.is_empty().await);

    // Still usable afterwards
    queue.enqueue("c", Action::Create, json!(3)).await.unwrap();
    assert_eq!(queue.len().await, 1);
}

#[tokio::test]
async fn queue_survives_reopen_and_keeps_ordering() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");
    let ns = Namespace::default();

    let first = {
        let queue = SyncQueue::new(Arc::new(SqliteStore::open(&path).unwrap()), &ns);
        queue.enqueue("members", Action::Create, json!({"id": 1})).await.unwrap()
    };

    let queue = SyncQueue::new(Arc::new(SqliteStore::open(&path).unwrap()), &ns);
    let second = queue.enqueue("members", Action::Update, json!({"id": 1})).await.unwrap();
    assert!(second > first);

    let items = queue.list().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, first);
    assert_eq!(items[1].id, second);
}

#[tokio::test]
async fn concurrent_enqueues_are_not_lost() {
    let queue = make_queue();
    let mut handles = Vec::new();
    for n in 0..20 {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            queue.enqueue("members", Action::Create, json!(n)).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let items = queue.list().await;
    assert_eq!(items.len(), 20);
    assert!(items.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn unreadable_queue_lists_empty_and_enqueue_errors() {
    let store = Arc::new(FlakyStore::new());
    let queue = SyncQueue::new(store.clone(), &Namespace::default());
    queue.enqueue("members", Action::Create, json!(1)).await.unwrap();

    store.set_failing(true);
    assert!(queue.list().await.is_empty());
    assert!(queue.enqueue("members", Action::Create, json!(2)).await.is_err());

    store.set_failing(false);
    assert_eq!(queue.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn enqueues_through_two_handles_on_one_file_are_all_kept() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");
    let ns = Namespace::default();
    let queues = [
        SyncQueue::new(Arc::new(SqliteStore::open(&path).unwrap()), &ns),
        SyncQueue::new(Arc::new(SqliteStore::open(&path).unwrap()), &ns),
    ];

    let mut handles = Vec::new();
    for n in 0..100 {
        let queue = queues[n % 2].clone();
        handles.push(tokio::spawn(async move {
            queue.enqueue("members", Action::Create, json!(n)).await.unwrap()
        }));
    }
    let mut acknowledged = Vec::new();
    for handle in handles {
        acknowledged.push(handle.await.unwrap());
    }

    let reopened = SyncQueue::new(Arc::new(SqliteStore::open(&path).unwrap()), &ns);
    let items = reopened.list().await;
    assert_eq!(items.len(), 100);
    assert!(items.windows(2).all(|w| w[0].id < w[1].id));
    acknowledged.sort();
    let persisted: Vec<_> = items.iter().map(|i| i.id).collect();
    assert_eq!(persisted, acknowledged);
}

#[tokio::test]
async fn removal_by_one_handle_keeps_enqueue_by_another() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");
    let ns = Namespace::default();
    let drainer = SyncQueue::new(Arc::new(SqliteStore::open(&path).unwrap()), &ns);
    let writer = SyncQueue::new(Arc::new(SqliteStore::open(&path).unwrap()), &ns);

    let first = writer.enqueue("members", Action::Create, json!(1)).await.unwrap();
    let snapshot = drainer.list().await;
    let second = writer.enqueue("members", Action::Update, json!(2)).await.unwrap();

    // The drainer removes what it saw; the later write must survive
    assert!(drainer.remove(snapshot[0].id).await.unwrap());
    let ids: Vec<_> = writer.list().await.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![second]);
    assert!(second > first);
}
