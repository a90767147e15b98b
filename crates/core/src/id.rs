// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Time-ordered identifiers for queued mutations.
//!
//! Format: `{wall_ms}-{counter}`
//!
//! Ids compare by wall clock first and by counter second, so sorting by id
//! reproduces insertion order even when several mutations land in the same
//! millisecond or the wall clock steps backwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Identifier of a [`SyncQueueItem`](crate::SyncQueueItem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct QueueId {
    /// Wall clock time in milliseconds since Unix epoch.
    pub wall_ms: u64,
    /// Logical counter for ids minted in the same millisecond.
    pub counter: u32,
}

impl QueueId {
    /// Creates an id with the given components.
    pub fn new(wall_ms: u64, counter: u32) -> Self {
        QueueId { wall_ms, counter }
    }

    /// Parses an id from its string representation.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wall_ms, self.counter)
    }
}

impl FromStr for QueueId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (wall, counter) = s.split_once('-').ok_or_else(|| {
            Error::InvalidQueueId(format!("expected format 'wall_ms-counter', got '{s}'"))
        })?;

        let wall_ms = wall
            .parse::<u64>()
            .map_err(|_| Error::InvalidQueueId(format!("invalid wall_ms '{wall}' in '{s}'")))?;
        let counter = counter
            .parse::<u32>()
            .map_err(|_| Error::InvalidQueueId(format!("invalid counter '{counter}' in '{s}'")))?;

        Ok(QueueId::new(wall_ms, counter))
    }
}

impl From<QueueId> for String {
    fn from(id: QueueId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for QueueId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Trait for getting the current wall clock time.
///
/// This allows injecting a mock clock for testing.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Generator of strictly increasing [`QueueId`]s.
pub struct QueueIdGenerator<C: ClockSource = SystemClock> {
    clock: C,
    last: Mutex<QueueId>,
}

impl QueueIdGenerator<SystemClock> {
    /// Creates a generator backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for QueueIdGenerator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ClockSource> QueueIdGenerator<C> {
    /// Creates a generator with a custom clock source.
    pub fn with_clock(clock: C) -> Self {
        QueueIdGenerator {
            clock,
            last: Mutex::new(QueueId::new(0, 0)),
        }
    }

    /// Mints the next id.
    ///
    /// Guarantees the result is greater than every id previously minted or
    /// observed, even if the wall clock goes backwards.
    pub fn next(&self) -> QueueId {
        let physical = self.clock.now_ms();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        let id = if physical > last.wall_ms {
            QueueId::new(physical, 0)
        } else {
            QueueId::new(last.wall_ms, last.counter.saturating_add(1))
        };

        *last = id;
        id
    }

    /// Records an id minted elsewhere (e.g. loaded from storage) so later
    /// ids sort after it.
    pub fn observe(&self, id: QueueId) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if id > *last {
            *last = id;
        }
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
