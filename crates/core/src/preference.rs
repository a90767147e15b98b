// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted offline-mode preference.
//!
//! When enabled, reads are served from cache only and no sync is attempted,
//! even if the network is reachable. Defaults to disabled and only changes
//! through an explicit user toggle.

use std::sync::Arc;

use crate::error::Result;
use crate::storage::{KeyValueStore, Namespace};

/// User-togglable offline-mode flag.
#[derive(Clone)]
pub struct OfflineMode {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl OfflineMode {
    pub fn new(store: Arc<dyn KeyValueStore>, ns: &Namespace) -> Self {
        OfflineMode {
            store,
            key: ns.key("offline_mode"),
        }
    }

    /// Current value. Unset or unreadable reads as disabled.
    pub async fn is_enabled(&self) -> bool {
        match self.store.get(&self.key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read offline mode, assuming disabled");
                false
            }
        }
    }

    /// Persist a new value.
    pub async fn set(&self, enabled: bool) -> Result<()> {
        self.store
            .set(&self.key, serde_json::to_string(&enabled)?)
            .await?;
        tracing::info!(enabled, "offline mode changed");
        Ok(())
    }

    /// Flip the flag and return the new value.
    pub async fn toggle(&self) -> Result<bool> {
        let mut enabled = false;
        let flipped = &mut enabled;
        self.store
            .update(
                &self.key,
                Box::new(move |raw| {
                    let current = raw
                        .and_then(|raw| serde_json::from_str(&raw).ok())
                        .unwrap_or(false);
                    *flipped = !current;
                    Ok(Some(serde_json::to_string(&*flipped)?))
                }),
            )
            .await?;
        tracing::info!(enabled, "offline mode changed");
        Ok(enabled)
    }
}
