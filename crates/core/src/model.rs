// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Data model for offline state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::id::QueueId;

/// Number of failed attempts after which a queued mutation is dead.
pub const MAX_RETRIES: u32 = 3;

/// Kind of mutation recorded in the sync queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            _ => Err(Error::InvalidAction(s.to_string())),
        }
    }
}

/// A local mutation waiting to be applied remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncQueueItem {
    pub id: QueueId,
    /// Remote entity the mutation targets (e.g. "members").
    pub entity: String,
    pub action: Action,
    /// Opaque argument handed to the remote mutation.
    pub payload: Value,
    /// Failed application attempts so far.
    pub retries: u32,
    pub created_at: DateTime<Utc>,
}

impl SyncQueueItem {
    /// Returns true once the item has exhausted its retry budget.
    pub fn is_dead(&self) -> bool {
        self.retries >= MAX_RETRIES
    }
}

/// A cached query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub data: Value,
    /// Time the entry was written, in milliseconds since Unix epoch.
    pub timestamp: u64,
}

impl CacheEntry {
    /// Age of the entry at `now_ms`. Entries stamped in the future are age zero.
    pub fn age(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.timestamp))
    }

    /// Returns true if the entry is older than `max_age` at `now_ms`.
    ///
    /// The store never expires entries itself; callers pick the threshold.
    pub fn is_stale(&self, max_age: Duration, now_ms: u64) -> bool {
        self.age(now_ms) > max_age
    }
}

/// Aggregate state of the sync orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
    Success,
    Error,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::Syncing => "syncing",
            SyncState::Success => "success",
            SyncState::Error => "error",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of offline state shown to the user.
///
/// Derived from the stores and the orchestrator; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub state: SyncState,
    pub is_online: bool,
    pub is_offline_mode: bool,
    /// Live queue items (dead items excluded).
    pub pending_changes: usize,
    /// Items that exhausted their retry budget.
    pub dead_items: usize,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub cache_size_bytes: u64,
    /// Human-readable form of `cache_size_bytes`.
    pub cache_size: String,
}

impl Default for SyncStatus {
    fn default() -> Self {
        SyncStatus {
            state: SyncState::Idle,
            is_online: false,
            is_offline_mode: false,
            pending_changes: 0,
            dead_items: 0,
            last_sync_time: None,
            cache_size_bytes: 0,
            cache_size: crate::format::format_bytes(0),
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
