// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! cs-engine: Offline-first sync engine for clubsync
//!
//! Sits between the UI and the remote backend:
//! - reads go through a cache-first façade ([`CachedQuery`])
//! - writes made offline land in the durable sync queue
//! - the [`SyncOrchestrator`] drains the queue when connectivity returns or
//!   the app comes to the foreground
//!
//! [`OfflineSync`] wires all of it together behind one service object.

pub mod config;
pub mod connectivity;
pub mod drain_lock;
pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod query;
pub mod remote;
pub mod service;

pub use config::SyncConfig;
pub use connectivity::{ConnectivityMonitor, ConnectivityProbe, ProbeFuture};
pub use drain_lock::{DrainLease, DrainLock, ProcessLocal};
pub use error::{ProbeError, RemoteError, SyncError, SyncResult};
pub use lifecycle::{AppLifecycle, AppState, LifecycleBinding};
pub use orchestrator::{SyncOrchestrator, SyncOutcome, SyncReport};
pub use query::{CachedQuery, DataSource, QueryResponse, Refresh};
pub use remote::{RemoteApi, RemoteFuture};
pub use service::{ClearReport, MutationOutcome, OfflineSync};

#[cfg(test)]
mod test_helpers;
