// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle trigger binding.
//!
//! Runs the orchestrator on two edges only:
//! - connectivity going from offline to online
//! - the application coming to the foreground
//!
//! A sustained state never re-triggers. After the listener falls behind
//! and misses events, it rereads the current state and triggers if that
//! state is online or foreground, since the missed events may have hidden an
//! edge. Each trigger runs in its own task so
//! triggers that fire close together meet the orchestrator's drain lock
//! instead of queueing up behind each other.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::connectivity::ConnectivityMonitor;
use crate::orchestrator::SyncOrchestrator;

/// Application foreground/background state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Active,
    Inactive,
    Background,
}

/// Source of application lifecycle events, fed by the platform.
pub struct AppLifecycle {
    current: Mutex<AppState>,
    events: broadcast::Sender<AppState>,
}

impl AppLifecycle {
    pub fn new(initial: AppState) -> Self {
        let (events, _) = broadcast::channel(64);
        AppLifecycle {
            current: Mutex::new(initial),
            events,
        }
    }

    /// Last reported state.
    pub fn current(&self) -> AppState {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Platform callback: the application changed state.
    pub fn report(&self, state: AppState) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = state;
        tracing::debug!(?state, "app state changed");
        let _ = self.events.send(state);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppState> {
        self.events.subscribe()
    }
}

impl Default for AppLifecycle {
    fn default() -> Self {
        AppLifecycle::new(AppState::Active)
    }
}

/// Background task wiring lifecycle edges to the orchestrator.
pub struct LifecycleBinding {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl LifecycleBinding {
    /// Subscribe to both signal sources and start listening.
    ///
    /// Edges are detected relative to the state at the time of the call.
    pub fn spawn(
        orchestrator: Arc<SyncOrchestrator>,
        monitor: &Arc<ConnectivityMonitor>,
        lifecycle: &Arc<AppLifecycle>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let listener = Listener {
            network_rx: monitor.subscribe(),
            app_rx: lifecycle.subscribe(),
            online: monitor.is_online(),
            app_state: lifecycle.current(),
            orchestrator,
            monitor: Arc::clone(monitor),
            lifecycle: Arc::clone(lifecycle),
        };

        let handle = tokio::spawn(listener.run(cancel.clone()));
        LifecycleBinding { cancel, handle }
    }

    /// Stop listening and wait for the listener task to exit.
    ///
    /// Sync runs already started are left to finish on their own.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

struct Listener {
    orchestrator: Arc<SyncOrchestrator>,
    monitor: Arc<ConnectivityMonitor>,
    lifecycle: Arc<AppLifecycle>,
    network_rx: broadcast::Receiver<bool>,
    app_rx: broadcast::Receiver<AppState>,
    online: bool,
    app_state: AppState,
}

impl Listener {
    async fn run(mut self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                event = self.network_rx.recv() => match event {
                    Ok(now_online) => self.on_network(now_online, false),
                    Err(RecvError::Lagged(skipped)) => {
                        // The skipped events may have hidden an edge
                        tracing::warn!(skipped, "missed connectivity events, resyncing");
                        let now_online = self.monitor.is_online();
                        self.on_network(now_online, true);
                    }
                    Err(RecvError::Closed) => return,
                },
                event = self.app_rx.recv() => match event {
                    Ok(state) => self.on_app_state(state, false),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "missed app state events, resyncing");
                        let state = self.lifecycle.current();
                        self.on_app_state(state, true);
                    }
                    Err(RecvError::Closed) => return,
                },
            }
        }
    }

    fn on_network(&mut self, now_online: bool, missed: bool) {
        let was_online = std::mem::replace(&mut self.online, now_online);
        self.orchestrator.note_connectivity(now_online);
        if now_online && (!was_online || missed) {
            trigger(&self.orchestrator, "network restored");
        }
    }

    fn on_app_state(&mut self, state: AppState, missed: bool) {
        let previous = std::mem::replace(&mut self.app_state, state);
        if state == AppState::Active && (previous != AppState::Active || missed) {
            trigger(&self.orchestrator, "app foregrounded");
        }
    }
}

fn trigger(orchestrator: &Arc<SyncOrchestrator>, reason: &'static str) {
    tracing::info!(reason, "triggering sync");
    let orchestrator = Arc::clone(orchestrator);
    tokio::spawn(async move {
        orchestrator.process_sync_queue().await;
    });
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
