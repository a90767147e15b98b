// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The offline sync service handed to the UI layer.
//!
//! [`OfflineSync`] is built once at application start from the platform
//! adapters (storage, remote API, reachability probe) and owns every
//! component of the engine. The UI reads [`SyncStatus`] from it and calls
//! its actions; platform callbacks go to [`OfflineSync::monitor`] and
//! [`OfflineSync::lifecycle`].

use std::sync::{Arc, Mutex};

use cs_core::{
    Action, CacheStore, KeyValueStore, OfflineMode, QueueId, SyncQueue, SyncQueueItem, SyncStatus,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::config::SyncConfig;
use crate::connectivity::{ConnectivityMonitor, ConnectivityProbe};
use crate::drain_lock::{DrainLock, ProcessLocal};
use crate::error::SyncResult;
use crate::lifecycle::{AppLifecycle, LifecycleBinding};
use crate::orchestrator::{SyncOrchestrator, SyncOutcome};
use crate::query::{CachedQuery, QueryResponse};
use crate::remote::{self, RemoteApi};

/// What happened to a local mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The remote API accepted it.
    Applied,
    /// It was stored in the sync queue for a later run.
    Queued(QueueId),
}

/// Counts removed by [`OfflineSync::clear_offline_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    pub queue_items: usize,
    pub cache_entries: usize,
}

/// Offline-first sync engine.
pub struct OfflineSync {
    queue: SyncQueue,
    cache: CacheStore,
    offline_mode: OfflineMode,
    monitor: Arc<ConnectivityMonitor>,
    lifecycle: Arc<AppLifecycle>,
    remote: Arc<dyn RemoteApi>,
    orchestrator: Arc<SyncOrchestrator>,
    query: CachedQuery,
    config: SyncConfig,
    binding: Mutex<Option<LifecycleBinding>>,
}

impl OfflineSync {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteApi>,
        probe: Arc<dyn ConnectivityProbe>,
        config: SyncConfig,
    ) -> Self {
        Self::with_drain_lock(store, remote, probe, Arc::new(ProcessLocal), config)
    }

    /// Build a service over a store that other processes may open too.
    /// `drain_lock` must be shared with them.
    pub fn with_drain_lock(
        store: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteApi>,
        probe: Arc<dyn ConnectivityProbe>,
        drain_lock: Arc<dyn DrainLock>,
        config: SyncConfig,
    ) -> Self {
        let ns = config.namespace.clone();
        let queue = SyncQueue::new(Arc::clone(&store), &ns);
        let cache = CacheStore::new(Arc::clone(&store), ns.clone());
        let offline_mode = OfflineMode::new(store, &ns);
        let monitor = Arc::new(ConnectivityMonitor::new(probe));

        let orchestrator = Arc::new(
            SyncOrchestrator::new(
                queue.clone(),
                cache.clone(),
                offline_mode.clone(),
                Arc::clone(&monitor),
                Arc::clone(&remote),
                config.clone(),
            )
            .with_drain_lock(drain_lock),
        );
        let query = CachedQuery::new(
            cache.clone(),
            offline_mode.clone(),
            Arc::clone(&monitor),
            config.stale_after,
            config.apply_timeout,
        );

        OfflineSync {
            queue,
            cache,
            offline_mode,
            monitor,
            lifecycle: Arc::new(AppLifecycle::default()),
            remote,
            orchestrator,
            query,
            config,
            binding: Mutex::new(None),
        }
    }

    /// Take an initial connectivity reading and start the lifecycle
    /// binding. Calling it again while started does nothing.
    pub async fn start(&self) -> SyncStatus {
        let status = self.refresh_status().await;

        let mut binding = self.binding.lock().unwrap_or_else(|e| e.into_inner());
        if binding.is_none() {
            *binding = Some(LifecycleBinding::spawn(
                Arc::clone(&self.orchestrator),
                &self.monitor,
                &self.lifecycle,
            ));
            tracing::info!(
                online = status.is_online,
                pending = status.pending_changes,
                "offline sync started"
            );
        }
        status
    }

    /// Stop the lifecycle binding.
    pub async fn shutdown(&self) {
        let binding = self
            .binding
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(binding) = binding {
            binding.shutdown().await;
            tracing::info!("offline sync stopped");
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.orchestrator.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.orchestrator.subscribe_status()
    }

    pub async fn refresh_status(&self) -> SyncStatus {
        self.orchestrator.refresh_status().await
    }

    /// Flip the offline-mode preference and return the new value.
    pub async fn toggle_offline_mode(&self) -> SyncResult<bool> {
        let enabled = self.offline_mode.toggle().await?;
        self.orchestrator.refresh_counts().await;
        Ok(enabled)
    }

    pub async fn set_offline_mode(&self, enabled: bool) -> SyncResult<()> {
        self.offline_mode.set(enabled).await?;
        self.orchestrator.refresh_counts().await;
        Ok(())
    }

    /// Manual "sync now".
    pub async fn process_sync_queue(&self) -> SyncOutcome {
        self.orchestrator.process_sync_queue().await
    }

    /// Wipe the sync queue and the cache. Irreversible; callers must get
    /// the user's confirmation first.
    pub async fn clear_offline_data(&self) -> SyncResult<ClearReport> {
        let queue_items = self.queue.clear_all().await?;
        let cache_entries = self.cache.clear_all().await?;
        self.orchestrator.refresh_counts().await;
        tracing::warn!(queue_items, cache_entries, "offline data cleared");
        Ok(ClearReport {
            queue_items,
            cache_entries,
        })
    }

    /// Perform a local mutation.
    ///
    /// The mutation is queued instead of applied when the network is down,
    /// offline mode is on, or earlier mutations are still pending (so it
    /// cannot overtake them). A transient remote failure also queues it; a
    /// permanent one is returned to the caller.
    pub async fn mutate(
        &self,
        entity: &str,
        action: Action,
        payload: Value,
    ) -> SyncResult<MutationOutcome> {
        let direct = !self.offline_mode.is_enabled().await
            && self.queue.pending().await.is_empty()
            && self.monitor.current_status().await;

        if direct {
            let call = self.remote.apply(entity, action, &payload);
            match remote::bounded(self.config.apply_timeout, call).await {
                Ok(()) => {
                    tracing::debug!(entity, %action, "mutation applied");
                    return Ok(MutationOutcome::Applied);
                }
                Err(e) if e.is_transient() => {
                    tracing::info!(entity, %action, error = %e, "mutation failed, queueing");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let id = self.enqueue(entity, action, payload).await?;
        Ok(MutationOutcome::Queued(id))
    }

    /// Append a mutation to the sync queue without trying the network.
    pub async fn enqueue(&self, entity: &str, action: Action, payload: Value) -> SyncResult<QueueId> {
        let id = self.queue.enqueue(entity, action, payload).await?;
        self.orchestrator.refresh_counts().await;
        Ok(id)
    }

    /// Live and dead queue items in FIFO order.
    pub async fn queued_items(&self) -> Vec<SyncQueueItem> {
        self.queue.list().await
    }

    /// Drop a dead item.
    pub async fn discard(&self, id: QueueId) -> SyncResult<()> {
        self.queue.discard(id).await?;
        self.orchestrator.refresh_counts().await;
        Ok(())
    }

    /// Reset an item's retry budget so the next run applies it again.
    pub async fn revive(&self, id: QueueId) -> SyncResult<()> {
        self.queue.revive(id).await?;
        self.orchestrator.refresh_counts().await;
        Ok(())
    }

    /// Cache-first read of the remote query `key`.
    pub async fn query(&self, key: &str) -> SyncResult<QueryResponse> {
        let remote = Arc::clone(&self.remote);
        let owned = key.to_string();
        self.query
            .get_cached_or_fetch(key, move || async move { remote.fetch(&owned).await })
            .await
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    pub fn lifecycle(&self) -> &AppLifecycle {
        &self.lifecycle
    }

    pub fn queue(&self) -> &SyncQueue {
        &self.queue
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
