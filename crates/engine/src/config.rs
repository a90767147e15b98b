// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.

use std::time::Duration;

use cs_core::storage::Namespace;

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Upper bound on a single remote apply. A timeout counts as a
    /// transient failure.
    pub apply_timeout: Duration,
    /// Move items straight to the dead sub-state on a permanent failure
    /// instead of spending the retry budget on them.
    pub dead_letter_permanent: bool,
    /// Age after which cached query results are flagged stale.
    pub stale_after: Duration,
    /// Prefix for every storage key the engine owns.
    pub namespace: Namespace,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            apply_timeout: Duration::from_secs(30),
            dead_letter_permanent: false,
            stale_after: Duration::from_secs(300),
            namespace: Namespace::default(),
        }
    }
}
