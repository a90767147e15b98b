// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync orchestrator: drains the sync queue against the remote API.
//!
//! State machine: `idle -> syncing -> {success, error}`. A run:
//! 1. Returns immediately if another run holds the drain lock, in this
//!    process or (through the [`DrainLock`]) in another one
//! 2. Returns without touching the queue when offline or in offline mode
//! 3. Applies every live item strictly in FIFO order; a failed item gets its
//!    retry count bumped and the run moves on to the next one
//! 4. Counts dead items as errors without applying them
//! 5. Ends in `success` only if nothing failed and nothing is dead
//!
//! There is no backoff inside a run. Retries happen on the next trigger
//! (reconnect, foreground, manual sync).

use std::sync::Arc;

use chrono::Utc;
use cs_core::{CacheStore, OfflineMode, SyncQueue, SyncQueueItem, SyncState, SyncStatus};
use serde::Serialize;
use tokio::sync::{watch, Mutex};

use crate::config::SyncConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::drain_lock::{DrainLock, ProcessLocal};
use crate::error::RemoteError;
use crate::remote::{self, RemoteApi};

/// Counts from one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Items applied and removed from the queue.
    pub succeeded: usize,
    /// Items whose application failed during this run.
    pub failed: usize,
    /// Dead items skipped by this run.
    pub dead: usize,
}

impl SyncReport {
    /// Total errors surfaced to the user.
    pub fn errors(&self) -> usize {
        self.failed + self.dead
    }

    pub fn is_clean(&self) -> bool {
        self.errors() == 0
    }
}

/// Result of [`SyncOrchestrator::process_sync_queue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another run, here or in another process, was active; nothing was done.
    AlreadyRunning,
    /// The network is unreachable; the queue was not touched.
    Offline,
    /// Offline mode is enabled; the queue was not touched.
    OfflineMode,
    /// A drain pass ran to completion.
    Completed(SyncReport),
}

/// Coordinator that drains the sync queue and owns the aggregate status.
pub struct SyncOrchestrator {
    queue: SyncQueue,
    cache: CacheStore,
    offline_mode: OfflineMode,
    monitor: Arc<ConnectivityMonitor>,
    remote: Arc<dyn RemoteApi>,
    config: SyncConfig,
    /// Held for the whole drain pass.
    drain: Mutex<()>,
    shared: Arc<dyn DrainLock>,
    status: watch::Sender<SyncStatus>,
}

/// Resets a `syncing` state left behind by a run that unwound early.
struct RunGuard<'a> {
    status: &'a watch::Sender<SyncStatus>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.status.send_if_modified(|s| {
            if s.state == SyncState::Syncing {
                s.state = SyncState::Error;
                true
            } else {
                false
            }
        });
    }
}

impl SyncOrchestrator {
    pub fn new(
        queue: SyncQueue,
        cache: CacheStore,
        offline_mode: OfflineMode,
        monitor: Arc<ConnectivityMonitor>,
        remote: Arc<dyn RemoteApi>,
        config: SyncConfig,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        SyncOrchestrator {
            queue,
            cache,
            offline_mode,
            monitor,
            remote,
            config,
            drain: Mutex::new(()),
            shared: Arc::new(ProcessLocal),
            status,
        }
    }

    /// Also hold `lock` for every drain pass, so other processes sharing
    /// the queue never drain it at the same time.
    pub fn with_drain_lock(mut self, lock: Arc<dyn DrainLock>) -> Self {
        self.shared = lock;
        self
    }

    /// Latest status snapshot.
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Returns true while a drain pass is running.
    pub fn is_syncing(&self) -> bool {
        self.status.borrow().state == SyncState::Syncing
    }

    /// Recompute every derived status field from the stores and a fresh
    /// connectivity check.
    pub async fn refresh_status(&self) -> SyncStatus {
        let is_online = self.monitor.current_status().await;
        self.recompute(is_online).await
    }

    /// Recompute queue and cache figures, keeping the last known
    /// connectivity state.
    pub async fn refresh_counts(&self) -> SyncStatus {
        self.recompute(self.monitor.is_online()).await
    }

    /// Update the online flag after a connectivity event.
    pub fn note_connectivity(&self, online: bool) {
        self.status.send_if_modified(|s| {
            let changed = s.is_online != online;
            s.is_online = online;
            changed
        });
    }

    async fn recompute(&self, is_online: bool) -> SyncStatus {
        self.publish(is_online, |_| {}).await
    }

    /// Gather queue and cache figures and publish them together with any
    /// extra changes in a single status update.
    async fn publish(&self, is_online: bool, finish: impl FnOnce(&mut SyncStatus)) -> SyncStatus {
        let items = self.queue.list().await;
        let dead_items = items.iter().filter(|i| i.is_dead()).count();
        let cache_size_bytes = self.cache.size_bytes().await;
        let is_offline_mode = self.offline_mode.is_enabled().await;

        self.status.send_modify(|s| {
            s.is_online = is_online;
            s.is_offline_mode = is_offline_mode;
            s.pending_changes = items.len() - dead_items;
            s.dead_items = dead_items;
            s.cache_size_bytes = cache_size_bytes;
            s.cache_size = cs_core::format_bytes(cache_size_bytes);
            finish(s);
        });
        self.status()
    }

    /// Drain the sync queue once.
    ///
    /// At most one run is active at a time: a call made while another run
    /// is in progress returns [`SyncOutcome::AlreadyRunning`] without
    /// waiting for it.
    pub async fn process_sync_queue(&self) -> SyncOutcome {
        let Ok(_lock) = self.drain.try_lock() else {
            tracing::debug!("sync already running, skipping");
            return SyncOutcome::AlreadyRunning;
        };
        let _lease = match self.shared.try_acquire() {
            Ok(Some(lease)) => lease,
            Ok(None) => {
                tracing::debug!("queue is being drained elsewhere, skipping");
                return SyncOutcome::AlreadyRunning;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to take drain lock, skipping sync");
                return SyncOutcome::AlreadyRunning;
            }
        };

        if self.offline_mode.is_enabled().await {
            tracing::debug!("offline mode enabled, skipping sync");
            return SyncOutcome::OfflineMode;
        }
        if !self.monitor.current_status().await {
            tracing::debug!("offline, skipping sync");
            self.note_connectivity(false);
            return SyncOutcome::Offline;
        }

        let guard = RunGuard {
            status: &self.status,
        };
        self.status.send_modify(|s| {
            s.state = SyncState::Syncing;
            s.is_online = true;
        });

        let items = self.queue.list().await;
        tracing::info!(items = items.len(), "sync started");

        let mut report = SyncReport::default();
        for item in &items {
            if item.is_dead() {
                report.dead += 1;
                continue;
            }

            match self.apply(item).await {
                Ok(()) => {
                    report.succeeded += 1;
                    if let Err(e) = self.queue.remove(item.id).await {
                        tracing::warn!(id = %item.id, error = %e, "applied item could not be removed");
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    self.record_failure(item, &e).await;
                }
            }
        }

        let state = if report.is_clean() {
            SyncState::Success
        } else {
            SyncState::Error
        };
        self.publish(true, |s| {
            s.state = state;
            s.last_sync_time = Some(Utc::now());
        })
        .await;
        drop(guard);

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            dead = report.dead,
            %state,
            "sync finished"
        );
        SyncOutcome::Completed(report)
    }

    async fn apply(&self, item: &SyncQueueItem) -> Result<(), RemoteError> {
        let call = self.remote.apply(&item.entity, item.action, &item.payload);
        remote::bounded(self.config.apply_timeout, call).await
    }

    async fn record_failure(&self, item: &SyncQueueItem, error: &RemoteError) {
        tracing::warn!(
            id = %item.id,
            entity = %item.entity,
            action = %item.action,
            error = %error,
            "failed to apply queued mutation"
        );

        let result = if !error.is_transient() && self.config.dead_letter_permanent {
            self.queue.mark_dead(item.id).await
        } else {
            self.queue.increment_retries(item.id).await.map(|_| ())
        };
        if let Err(e) = result {
            tracing::warn!(id = %item.id, error = %e, "failed to record sync failure");
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
