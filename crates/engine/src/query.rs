// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cache-aware query façade.
//!
//! Wraps a single remote read identified by a key:
//! 1. A cached value is returned right away, marked as coming from cache
//! 2. With offline mode on or the network down, the cached value (or its
//!    absence) is final
//! 3. Otherwise the query runs and a successful result is written back to
//!    the cache
//!
//! When a cached value exists the network step runs in a spawned task and
//! the caller gets a [`Refresh`] handle for it, so the call itself never
//! waits on the network. Every fetch is bounded by the fetch timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cs_core::{CacheEntry, CacheStore, OfflineMode};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::connectivity::ConnectivityMonitor;
use crate::error::{RemoteError, SyncError, SyncResult};
use crate::remote;

/// Where a query result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Cache,
    Network,
}

/// In-flight network refresh started after serving a cached value.
///
/// Dropping the handle lets the refresh finish in the background; the
/// cache is updated either way.
#[derive(Debug)]
pub struct Refresh {
    handle: JoinHandle<SyncResult<Value>>,
}

impl Refresh {
    /// Wait for the fresh value.
    pub async fn wait(self) -> SyncResult<Value> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(SyncError::RefreshAborted(e.to_string())),
        }
    }
}

/// Result of [`CachedQuery::get_cached_or_fetch`].
#[derive(Debug)]
pub struct QueryResponse {
    /// The value, or `None` if nothing is cached and the network was not used.
    pub data: Option<Value>,
    pub source: DataSource,
    /// Epoch milliseconds when `data` was fetched from the network.
    pub timestamp: Option<u64>,
    /// True if the cached value is older than the staleness threshold.
    pub stale: bool,
    pub refresh: Option<Refresh>,
}

impl QueryResponse {
    fn from_entry(entry: CacheEntry, stale: bool, refresh: Option<Refresh>) -> Self {
        QueryResponse {
            data: Some(entry.data),
            source: DataSource::Cache,
            timestamp: Some(entry.timestamp),
            stale,
            refresh,
        }
    }

    fn miss() -> Self {
        QueryResponse {
            data: None,
            source: DataSource::Cache,
            timestamp: None,
            stale: false,
            refresh: None,
        }
    }
}

/// Cache-first reader.
#[derive(Clone)]
pub struct CachedQuery {
    cache: CacheStore,
    offline_mode: OfflineMode,
    monitor: Arc<ConnectivityMonitor>,
    stale_after: Duration,
    fetch_timeout: Duration,
}

impl CachedQuery {
    pub fn new(
        cache: CacheStore,
        offline_mode: OfflineMode,
        monitor: Arc<ConnectivityMonitor>,
        stale_after: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        CachedQuery {
            cache,
            offline_mode,
            monitor,
            stale_after,
            fetch_timeout,
        }
    }

    /// Serve `key` from cache, refreshing it through `fetch` when the
    /// network is usable.
    ///
    /// With a cached value, network usability is judged from the last known
    /// connectivity state so no reachability check sits in front of it. On a
    /// miss the connectivity is checked first, since there is nothing to
    /// serve while waiting. A fetch failure is only returned when there was
    /// nothing cached; the previous cache entry is left untouched.
    pub async fn get_cached_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> SyncResult<QueryResponse>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
    {
        let cached = self.cache.get(key).await;
        let offline_mode = self.offline_mode.is_enabled().await;

        if let Some(entry) = cached {
            let network = !offline_mode && self.monitor.is_online();
            let stale = entry.is_stale(self.stale_after, self.cache.now_ms());
            tracing::debug!(key, stale, network, "serving cached query");
            let refresh = network.then(|| self.spawn_refresh(key, fetch));
            return Ok(QueryResponse::from_entry(entry, stale, refresh));
        }

        if offline_mode || !self.monitor.current_status().await {
            tracing::debug!(key, "cache miss while offline");
            return Ok(QueryResponse::miss());
        }

        let data = remote::bounded(self.fetch_timeout, fetch()).await?;
        let entry = self.cache.put(key, data).await;
        Ok(QueryResponse {
            data: Some(entry.data),
            source: DataSource::Network,
            timestamp: Some(entry.timestamp),
            stale: false,
            refresh: None,
        })
    }

    fn spawn_refresh<F, Fut>(&self, key: &str, fetch: F) -> Refresh
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
    {
        let cache = self.cache.clone();
        let key = key.to_string();
        let limit = self.fetch_timeout;
        let handle = tokio::spawn(async move {
            match remote::bounded(limit, fetch()).await {
                Ok(data) => Ok(cache.put(&key, data).await.data),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "background refresh failed");
                    Err(e.into())
                }
            }
        });
        Refresh { handle }
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
