// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory lock file guarding queue drains across processes.
//!
//! A `watch` process and a one-shot `sync` can share a state directory.
//! Both take an exclusive lock on the same file for the length of a drain
//! pass. The operating system releases it when the holder exits, crashes
//! included.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use cs_engine::{DrainLease, DrainLock};
use fs2::FileExt;

/// Drain lock backed by an exclusive lock on a file.
#[derive(Debug, Clone)]
pub struct FileDrainLock {
    path: PathBuf,
}

impl FileDrainLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileDrainLock { path: path.into() }
    }
}

impl DrainLock for FileDrainLock {
    fn try_acquire(&self) -> io::Result<Option<DrainLease>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(DrainLease::new(file))),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
