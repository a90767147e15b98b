// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Lock shared by every orchestrator draining the same queue.
//!
//! The orchestrator's own mutex only covers one process. When several
//! processes open the same durable queue, a [`DrainLock`] keeps their drain
//! passes apart as well.

use std::io;

/// Proof that the drain lock is held. Dropping it releases the lock.
pub struct DrainLease {
    _held: Box<dyn Send + Sync>,
}

impl DrainLease {
    /// Wrap whatever keeps the lock alive (a locked file, a lease row).
    pub fn new(held: impl Send + Sync + 'static) -> Self {
        DrainLease {
            _held: Box::new(held),
        }
    }
}

/// Non-blocking lock around a whole drain pass.
pub trait DrainLock: Send + Sync {
    /// Take the lock without waiting.
    ///
    /// Returns `Ok(None)` when another holder has it.
    fn try_acquire(&self) -> io::Result<Option<DrainLease>>;
}

/// Lock for a queue only one process ever opens.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLocal;

impl DrainLock for ProcessLocal {
    fn try_acquire(&self) -> io::Result<Option<DrainLease>> {
        Ok(Some(DrainLease::new(())))
    }
}
