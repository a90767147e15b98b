// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable FIFO queue of local mutations awaiting remote application.
//!
//! The whole queue is stored as one JSON array under a namespaced key, in
//! insertion order. Every change is a read-modify-write of that array run
//! through [`KeyValueStore::update`], so handles in other tasks or other
//! processes sharing the same store never overwrite each other's changes.
//!
//! The queue never evicts on its own. Items whose `retries` reached
//! [`MAX_RETRIES`] stay in place as dead items until the user discards or
//! revives them; [`SyncQueue::pending`] and [`SyncQueue::dead`] split the two.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::id::{QueueId, QueueIdGenerator};
use crate::model::{Action, SyncQueueItem, MAX_RETRIES};
use crate::storage::{KeyValueStore, Namespace};

/// Persisted queue of pending mutations.
#[derive(Clone)]
pub struct SyncQueue {
    store: Arc<dyn KeyValueStore>,
    key: String,
    ids: Arc<QueueIdGenerator>,
}

fn parse(raw: Option<&str>) -> Result<Vec<SyncQueueItem>> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(raw)?),
        _ => Ok(Vec::new()),
    }
}

impl SyncQueue {
    /// Open the queue stored in `store` under the given namespace.
    pub fn new(store: Arc<dyn KeyValueStore>, ns: &Namespace) -> Self {
        SyncQueue {
            store,
            key: ns.key("queue"),
            ids: Arc::new(QueueIdGenerator::new()),
        }
    }

    async fn load(&self) -> Result<Vec<SyncQueueItem>> {
        let raw = self.store.get(&self.key).await?;
        parse(raw.as_deref())
    }

    /// Apply `edit` to the stored items atomically and return its result.
    ///
    /// Nothing is written when `edit` fails.
    async fn modify<T, F>(&self, edit: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut Vec<SyncQueueItem>) -> Result<T> + Send,
    {
        let mut out = None;
        let slot = &mut out;
        self.store
            .update(
                &self.key,
                Box::new(move |raw| {
                    let mut items = parse(raw.as_deref())?;
                    *slot = Some(edit(&mut items)?);
                    Ok(Some(serde_json::to_string(&items)?))
                }),
            )
            .await?;
        out.ok_or_else(|| Error::Storage("queue update was not applied".to_string()))
    }

    /// Append a mutation with `retries = 0` and return its id.
    ///
    /// The item is persisted before the id is returned.
    pub async fn enqueue(&self, entity: &str, action: Action, payload: Value) -> Result<QueueId> {
        let ids = &self.ids;
        let id = self
            .modify(|items| {
                // Ids minted by other handles must still sort first
                if let Some(last) = items.last() {
                    ids.observe(last.id);
                }
                let id = ids.next();
                items.push(SyncQueueItem {
                    id,
                    entity: entity.to_string(),
                    action,
                    payload,
                    retries: 0,
                    created_at: Utc::now(),
                });
                Ok(id)
            })
            .await?;

        tracing::debug!(%id, entity, %action, "enqueued mutation");
        Ok(id)
    }

    /// All items in FIFO order, dead items included.
    ///
    /// An unreadable queue is logged and reported as empty.
    pub async fn list(&self) -> Vec<SyncQueueItem> {
        match self.load().await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read sync queue");
                Vec::new()
            }
        }
    }

    /// Items still eligible for application, in FIFO order.
    pub async fn pending(&self) -> Vec<SyncQueueItem> {
        self.list()
            .await
            .into_iter()
            .filter(|i| !i.is_dead())
            .collect()
    }

    /// Items that exhausted their retry budget, in FIFO order.
    pub async fn dead(&self) -> Vec<SyncQueueItem> {
        self.list()
            .await
            .into_iter()
            .filter(SyncQueueItem::is_dead)
            .collect()
    }

    /// Total number of items, dead items included.
    pub async fn len(&self) -> usize {
        self.list().await.len()
    }

    /// Returns true if the queue holds no items at all.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Delete an item. Returns false if it was not queued.
    pub async fn remove(&self, id: QueueId) -> Result<bool> {
        self.modify(|items| {
            let before = items.len();
            items.retain(|i| i.id != id);
            Ok(items.len() != before)
        })
        .await
    }

    async fn update<F>(&self, id: QueueId, f: F) -> Result<u32>
    where
        F: FnOnce(&mut SyncQueueItem) + Send,
    {
        self.modify(|items| {
            let item = items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| Error::ItemNotFound(id.to_string()))?;
            f(item);
            Ok(item.retries)
        })
        .await
    }

    /// Record a failed attempt and return the new retry count.
    ///
    /// The item stays queued even past [`MAX_RETRIES`]; removal is the
    /// caller's decision.
    pub async fn increment_retries(&self, id: QueueId) -> Result<u32> {
        self.update(id, |item| item.retries = item.retries.saturating_add(1))
            .await
    }

    /// Move an item straight to the dead sub-state.
    pub async fn mark_dead(&self, id: QueueId) -> Result<()> {
        self.update(id, |item| item.retries = item.retries.max(MAX_RETRIES))
            .await?;
        Ok(())
    }

    /// Reset a dead item's retry count so the next sync run retries it.
    pub async fn revive(&self, id: QueueId) -> Result<()> {
        self.update(id, |item| item.retries = 0).await?;
        tracing::info!(%id, "revived dead queue item");
        Ok(())
    }

    /// Remove a dead item. Live items are left alone.
    pub async fn discard(&self, id: QueueId) -> Result<()> {
        self.modify(|items| {
            let index = items
                .iter()
                .position(|i| i.id == id)
                .ok_or_else(|| Error::ItemNotFound(id.to_string()))?;
            if !items[index].is_dead() {
                return Err(Error::ItemNotDead(id.to_string()));
            }
            items.remove(index);
            Ok(())
        })
        .await?;
        tracing::info!(%id, "discarded dead queue item");
        Ok(())
    }

    /// Empty the queue. Returns the number of items dropped.
    ///
    /// Destructive and unrecoverable: pending mutations are lost. Callers
    /// must confirm with the user first. An unreadable queue is dropped too.
    pub async fn clear_all(&self) -> Result<usize> {
        let mut count = 0;
        let dropped = &mut count;
        self.store
            .update(
                &self.key,
                Box::new(move |raw| {
                    *dropped = parse(raw.as_deref()).map(|items| items.len()).unwrap_or(0);
                    Ok(Some("[]".to_string()))
                }),
            )
            .await?;
        tracing::warn!(dropped = count, "cleared sync queue");
        Ok(count)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
