// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for store tests.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Error;
use crate::storage::{KeyValueStore, MemoryStore, StoreFuture, UpdateFn};

/// Store wrapper whose operations can be switched to fail on demand.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> crate::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Error::Storage("simulated I/O failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for FlakyStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            self.check()?;
            self.inner.get(key).await
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.check()?;
            self.inner.set(key, value).await
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.check()?;
            self.inner.remove(key).await
        })
    }

    fn list_keys<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, Vec<String>> {
        Box::pin(async move {
            self.check()?;
            self.inner.list_keys(prefix).await
        })
    }

    fn update<'a>(&'a self, key: &'a str, edit: UpdateFn<'a>) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.check()?;
            self.inner.update(key, edit).await
        })
    }
}
