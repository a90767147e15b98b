// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote API abstraction.
//!
//! The engine only needs two calls from the backend: apply a queued
//! mutation selected by entity and action, and run a read query by key.
//! Concrete transports live with the application; tests use mocks.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use cs_core::Action;
use serde_json::Value;

use crate::error::RemoteError;

/// Boxed future returned by [`RemoteApi`] calls.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// Backend the sync engine talks to.
///
/// Applying the same mutation twice must be harmless: a run that times out
/// after the backend committed will retry the item.
pub trait RemoteApi: Send + Sync {
    /// Apply a mutation, using `entity` and `action` as the selector.
    fn apply<'a>(
        &'a self,
        entity: &'a str,
        action: Action,
        payload: &'a Value,
    ) -> RemoteFuture<'a, ()>;

    /// Run the read query identified by `key`.
    fn fetch<'a>(&'a self, key: &'a str) -> RemoteFuture<'a, Value>;
}

/// Run a remote call, failing with [`RemoteError::Timeout`] once `limit`
/// elapses.
pub async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, RemoteError>>,
) -> Result<T, RemoteError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout(limit)),
    }
}
