// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration and state directory layout.
//!
//! Everything clubsync persists lives in one state directory:
//! - `clubsync.toml`: optional settings, all keys have defaults
//! - `clubsync.db`: SQLite store holding the cache, queue and preferences

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cs_engine::SyncConfig;

use crate::env;
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "clubsync.toml";
pub const DB_FILE_NAME: &str = "clubsync.db";

/// Lock file held while a process drains the sync queue.
pub const DRAIN_LOCK_FILE_NAME: &str = "sync.lock";

/// Settings stored in `clubsync.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// WebSocket endpoint of the club backend (`ws://` or `wss://`).
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    /// `host:port` used for the reachability check. Derived from
    /// `remote_url` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_addr: Option<String>,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Upper bound on applying one queued mutation.
    #[serde(default = "default_apply_timeout_ms")]
    pub apply_timeout_ms: u64,
    /// Age after which cached data is reported stale.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    /// Reachability poll period for `clubsync watch`.
    #[serde(default = "default_watch_interval_secs")]
    pub watch_interval_secs: u64,
    /// Dead-letter permanently rejected mutations on their first failure.
    #[serde(default)]
    pub dead_letter_permanent: bool,
}

fn default_remote_url() -> String {
    "ws://localhost:7890".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

fn default_apply_timeout_ms() -> u64 {
    30_000
}

fn default_stale_after_secs() -> u64 {
    300
}

fn default_watch_interval_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote_url: default_remote_url(),
            probe_addr: None,
            probe_timeout_ms: default_probe_timeout_ms(),
            apply_timeout_ms: default_apply_timeout_ms(),
            stale_after_secs: default_stale_after_secs(),
            watch_interval_secs: default_watch_interval_secs(),
            dead_letter_permanent: false,
        }
    }
}

impl Config {
    /// Loads `clubsync.toml` from the state directory. A missing file
    /// yields the defaults.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to the state directory.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(state_dir.join(CONFIG_FILE_NAME), content)?;
        Ok(())
    }

    /// Checks that the remote URL is a WebSocket URL with a host.
    pub fn validate(&self) -> Result<()> {
        self.probe_address().map(|_| ())
    }

    /// Address the reachability probe connects to.
    pub fn probe_address(&self) -> Result<String> {
        if let Some(addr) = &self.probe_addr {
            return Ok(addr.clone());
        }
        derive_probe_addr(&self.remote_url)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs.max(1))
    }

    /// Engine settings derived from this file.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            apply_timeout: Duration::from_millis(self.apply_timeout_ms),
            dead_letter_permanent: self.dead_letter_permanent,
            stale_after: Duration::from_secs(self.stale_after_secs),
            ..SyncConfig::default()
        }
    }
}

/// Turns `ws://host[:port][/path]` into `host:port`, filling in the
/// scheme's default port.
pub fn derive_probe_addr(url: &str) -> Result<String> {
    let (rest, default_port) = if let Some(rest) = url.strip_prefix("ws://") {
        (rest, 80)
    } else if let Some(rest) = url.strip_prefix("wss://") {
        (rest, 443)
    } else {
        return Err(Error::Config(format!(
            "invalid remote URL '{}': must start with ws:// or wss://",
            url
        )));
    };

    let authority = rest.split(['/', '?']).next().unwrap_or_default();
    if authority.is_empty() {
        return Err(Error::Config(format!("remote URL '{}' has no host", url)));
    }

    // A trailing `:digits` is a port unless it is part of a bracketed IPv6 host
    let has_port = authority
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && !port.contains(']') && port.parse::<u16>().is_ok());
    if has_port {
        Ok(authority.to_string())
    } else {
        Ok(format!("{}:{}", authority, default_port))
    }
}

/// Resolve the state directory.
///
/// Precedence: `--state-dir`, `CLUBSYNC_STATE_DIR`,
/// `$XDG_STATE_HOME/clubsync`, `~/.local/state/clubsync`.
pub fn resolve_state_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join("clubsync");
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state/clubsync"))
        .unwrap_or_else(|| PathBuf::from(".local/state/clubsync"))
}

/// Path of the SQLite store inside the state directory.
pub fn db_path(state_dir: &Path) -> PathBuf {
    state_dir.join(DB_FILE_NAME)
}

/// Path of the drain lock file inside `state_dir`.
pub fn drain_lock_path(state_dir: &Path) -> PathBuf {
    state_dir.join(DRAIN_LOCK_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
