// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! cs-core: Durable offline state for clubsync
//!
//! This crate provides the data model and the durable stores used by the
//! sync engine: the query result cache, the pending mutation queue and the
//! offline-mode preference. All state lives behind a [`KeyValueStore`] so
//! the same code runs against SQLite on disk or an in-memory map in tests.

pub mod cache;
pub mod error;
pub mod format;
pub mod id;
pub mod model;
pub mod preference;
pub mod queue;
pub mod storage;

pub use cache::CacheStore;
pub use error::{Error, Result};
pub use format::format_bytes;
pub use id::{ClockSource, QueueId, QueueIdGenerator, SystemClock};
pub use model::{Action, CacheEntry, SyncQueueItem, SyncState, SyncStatus, MAX_RETRIES};
pub use preference::OfflineMode;
pub use queue::SyncQueue;
pub use storage::{KeyValueStore, MemoryStore, Namespace, SqliteStore, StoreFuture, UpdateFn};

#[cfg(test)]
mod test_helpers;
