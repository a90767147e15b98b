// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the sync engine.

use std::time::Duration;

use thiserror::Error;

/// Failure reported by the remote API.
///
/// The category decides retry policy: transient failures are always retried
/// up to the retry budget, permanent ones may be dead-lettered immediately.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Network error, 5xx, dropped connection.
    #[error("transient remote failure: {0}")]
    Transient(String),

    /// Validation error, conflict, 4xx.
    #[error("permanent remote failure: {0}")]
    Permanent(String),

    /// The call did not complete in time.
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),
}

impl RemoteError {
    /// Returns true if retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, RemoteError::Permanent(_))
    }
}

/// Failure of the platform reachability check.
#[derive(Debug, Error)]
#[error("connectivity check failed: {0}")]
pub struct ProbeError(pub String);

/// Error type for engine operations.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Core(#[from] cs_core::Error),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("background refresh aborted: {0}")]
    RefreshAborted(String),
}

/// Result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;
