// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All errors surfaced by the clubsync command line.
///
/// Messages carry a hint where the fix is not obvious.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] cs_core::Error),

    #[error(transparent)]
    Sync(#[from] cs_engine::SyncError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("operation cancelled")]
    Aborted,

    #[error("confirmation required\n  hint: pass --yes to clear offline data without a prompt")]
    ConfirmationRequired,

    #[error("{0}")]
    InvalidInput(String),
}

/// A specialized Result type for clubsync commands.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
