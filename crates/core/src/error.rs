// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for cs-core operations.

use thiserror::Error;

/// All possible errors that can occur in cs-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("queue item not found: {0}")]
    ItemNotFound(String),

    #[error("queue item {0} is still live\n  hint: only items that exhausted their retries can be discarded")]
    ItemNotDead(String),

    #[error("invalid action: '{0}'\n  hint: valid actions are: create, update, delete")]
    InvalidAction(String),

    #[error("invalid queue id: {0}")]
    InvalidQueueId(String),
}

/// A specialized Result type for cs-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
