// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitoring.
//!
//! Wraps the platform reachability signal into a boolean online state:
//! - [`ConnectivityMonitor::current_status`] asks the platform on demand
//! - [`ConnectivityMonitor::report`] is called by the platform on every change
//!   and forwarded to all subscribers, without debouncing
//!
//! A failing check is treated as offline and never reaches subscribers.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;

/// Boxed future returned by [`ConnectivityProbe::check`].
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = Result<bool, ProbeError>> + Send + 'a>>;

/// Point-in-time reachability check provided by the platform.
pub trait ConnectivityProbe: Send + Sync {
    fn check(&self) -> ProbeFuture<'_>;
}

/// Online/offline state with a stream of transitions.
pub struct ConnectivityMonitor {
    probe: Arc<dyn ConnectivityProbe>,
    online: AtomicBool,
    events: broadcast::Sender<bool>,
}

impl ConnectivityMonitor {
    /// Create a monitor. The state is offline until the first check or report.
    pub fn new(probe: Arc<dyn ConnectivityProbe>) -> Self {
        let (events, _) = broadcast::channel(64);
        ConnectivityMonitor {
            probe,
            online: AtomicBool::new(false),
            events,
        }
    }

    /// Ask the platform whether the network is reachable right now.
    pub async fn current_status(&self) -> bool {
        let online = match self.probe.check().await {
            Ok(online) => online,
            Err(e) => {
                tracing::warn!(error = %e, "connectivity check failed, assuming offline");
                false
            }
        };
        self.online.store(online, Ordering::Release);
        online
    }

    /// Last known state, without asking the platform.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Platform callback: forward a connectivity event to every subscriber.
    pub fn report(&self, online: bool) {
        self.online.store(online, Ordering::Release);
        tracing::info!(online, "connectivity changed");
        // No subscribers is fine
        let _ = self.events.send(online);
    }

    /// Subscribe to connectivity events. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.events.subscribe()
    }

    /// Poll the probe every `interval` and report changes.
    ///
    /// For platforms that only offer on-demand checks. Stops when `cancel`
    /// fires.
    pub fn spawn_poller(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut last = monitor.is_online();
            loop {
                let online = tokio::select! {
                    _ = cancel.cancelled() => return,
                    online = monitor.current_status() => online,
                };
                if online != last {
                    monitor.report(online);
                    last = online;
                }
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
