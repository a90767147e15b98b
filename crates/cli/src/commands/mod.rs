// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations.
//!
//! Every command opens the state directory, builds the sync service over
//! it and runs against that one instance.

pub mod clear;
pub mod fetch;
pub mod mutate;
pub mod offline;
pub mod queue;
pub mod status;
pub mod sync;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cs_core::SqliteStore;
use cs_engine::OfflineSync;

use crate::cli::Command;
use crate::config::{db_path, drain_lock_path, Config};
use crate::error::{Error, Result};
use crate::lockfile::FileDrainLock;
use crate::probe::TcpProbe;
use crate::remote::WebSocketRemote;

/// An opened state directory.
pub struct Context {
    pub state_dir: PathBuf,
    pub config: Config,
    pub sync: OfflineSync,
}

impl Context {
    /// Load the config and open the store in `state_dir`.
    pub fn open(state_dir: &Path) -> Result<Self> {
        let config = Config::load(state_dir)?;
        let store = Arc::new(SqliteStore::open(&db_path(state_dir))?);
        let probe = Arc::new(TcpProbe::new(
            config.probe_address()?,
            config.probe_timeout(),
        ));
        let remote = Arc::new(WebSocketRemote::new(
            config.remote_url.clone(),
            config.probe_timeout(),
        ));
        let drain_lock = Arc::new(FileDrainLock::new(drain_lock_path(state_dir)));
        let sync =
            OfflineSync::with_drain_lock(store, remote, probe, drain_lock, config.sync_config());
        tracing::debug!(state_dir = %state_dir.display(), "opened state directory");

        Ok(Context {
            state_dir: state_dir.to_path_buf(),
            config,
            sync,
        })
    }
}

/// Run one command against the state directory.
pub async fn dispatch(state_dir: &Path, command: Command) -> Result<()> {
    let ctx = Context::open(state_dir)?;
    match command {
        Command::Status { output } => status::run(&ctx, output).await,
        Command::Offline { switch } => offline::run(&ctx, switch).await,
        Command::Mutate {
            entity,
            action,
            payload,
        } => mutate::run(&ctx, &entity, action, &payload).await,
        Command::Enqueue {
            entity,
            action,
            payload,
        } => queue::enqueue(&ctx, &entity, action, &payload).await,
        Command::Queue { dead, output } => queue::list(&ctx, dead, output).await,
        Command::Discard { id } => queue::discard(&ctx, id).await,
        Command::Revive { id } => queue::revive(&ctx, id).await,
        Command::Sync { output } => sync::run(&ctx, output).await,
        Command::Fetch { key, wait, output } => fetch::run(&ctx, &key, wait, output).await,
        Command::Clear { yes } => clear::run(&ctx, yes).await,
        Command::Watch => watch::run(&ctx).await,
    }
}

/// Parse a JSON payload argument.
pub(crate) fn parse_payload(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw)
        .map_err(|e| Error::InvalidInput(format!("payload is not valid JSON: {}", e)))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
