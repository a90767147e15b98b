// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent cache of query results.
//!
//! One entry per key, last write wins. Entries never expire on their own:
//! staleness is judged by the caller from [`CacheEntry::timestamp`], and the
//! only reclaim path is [`CacheStore::clear_all`].
//!
//! Storage failures on reads are logged and reported as a cache miss so a
//! broken disk degrades to network-only behavior instead of an error.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::id::{ClockSource, SystemClock};
use crate::model::CacheEntry;
use crate::storage::{KeyValueStore, Namespace};

/// Key/value cache of previously fetched query results.
#[derive(Clone)]
pub struct CacheStore {
    store: Arc<dyn KeyValueStore>,
    ns: Namespace,
    clock: Arc<dyn ClockSource>,
}

impl CacheStore {
    /// Create a cache over the given store using the system clock.
    pub fn new(store: Arc<dyn KeyValueStore>, ns: Namespace) -> Self {
        Self::with_clock(store, ns, Arc::new(SystemClock))
    }

    /// Create a cache with a custom clock for entry timestamps.
    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        ns: Namespace,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        CacheStore { store, ns, clock }
    }

    /// Current time according to the cache clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Return the last stored entry for `key`, or `None` if never populated.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let raw = match self.store.get(&self.ns.cache_key(key)).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt cache entry, treating as miss");
                None
            }
        }
    }

    /// Store `data` under `key` stamped with the current time.
    ///
    /// Returns the written entry. A failed write is logged and leaves any
    /// previous entry in place.
    pub async fn put(&self, key: &str, data: Value) -> CacheEntry {
        let entry = CacheEntry {
            key: key.to_string(),
            data,
            timestamp: self.now_ms(),
        };

        let written = match serde_json::to_string(&entry) {
            Ok(json) => self.store.set(&self.ns.cache_key(key), json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = written {
            tracing::warn!(key, error = %e, "cache write failed");
        }

        entry
    }

    /// Total serialized size of all entries in bytes.
    ///
    /// For display only; nothing is evicted based on size.
    pub async fn size_bytes(&self) -> u64 {
        match self.try_size_bytes().await {
            Ok(size) => size,
            Err(e) => {
                tracing::warn!(error = %e, "failed to compute cache size");
                0
            }
        }
    }

    async fn try_size_bytes(&self) -> Result<u64> {
        let mut total = 0u64;
        for key in self.store.list_keys(&self.ns.cache_prefix()).await? {
            if let Some(value) = self.store.get(&key).await? {
                total += value.len() as u64;
            }
        }
        Ok(total)
    }

    /// Keys of all cached queries.
    pub async fn keys(&self) -> Vec<String> {
        let prefix = self.ns.cache_prefix();
        match self.store.list_keys(&prefix).await {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to list cache keys");
                Vec::new()
            }
        }
    }

    /// Delete every entry. Returns the number of entries removed.
    pub async fn clear_all(&self) -> Result<usize> {
        let keys = self.store.list_keys(&self.ns.cache_prefix()).await?;
        for key in &keys {
            self.store.remove(key).await?;
        }
        tracing::info!(removed = keys.len(), "cleared cache");
        Ok(keys.len())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
