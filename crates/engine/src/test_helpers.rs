// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for engine tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cs_core::Action;
use serde_json::Value;
use tokio::sync::{Notify, Semaphore};

use crate::connectivity::{ConnectivityProbe, ProbeFuture};
use crate::drain_lock::{DrainLease, DrainLock};
use crate::error::{ProbeError, RemoteError};
use crate::remote::{RemoteApi, RemoteFuture};

/// Probe returning a switchable answer, or an error.
#[derive(Default)]
pub struct MockProbe {
    online: AtomicBool,
    broken: AtomicBool,
    checks: AtomicUsize,
}

impl MockProbe {
    pub fn new(online: bool) -> Arc<Self> {
        let probe = MockProbe::default();
        probe.online.store(online, Ordering::SeqCst);
        Arc::new(probe)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl ConnectivityProbe for MockProbe {
    fn check(&self) -> ProbeFuture<'_> {
        Box::pin(async move {
            self.checks.fetch_add(1, Ordering::SeqCst);
            if self.broken.load(Ordering::SeqCst) {
                return Err(ProbeError("radio unavailable".to_string()));
            }
            Ok(self.online.load(Ordering::SeqCst))
        })
    }
}

/// Drain lock shared by orchestrators that stand in for separate processes.
#[derive(Default)]
pub struct SharedDrainLock {
    held: Arc<AtomicBool>,
}

struct Held(Arc<AtomicBool>);

impl Drop for Held {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl DrainLock for SharedDrainLock {
    fn try_acquire(&self) -> std::io::Result<Option<DrainLease>> {
        let taken = self
            .held
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        Ok(taken.then(|| DrainLease::new(Held(Arc::clone(&self.held)))))
    }
}

/// What the mock remote does for a given payload tag.
#[derive(Clone)]
pub enum Behavior {
    Fail(RemoteError),
    Hang,
}

/// Scriptable remote recording every call.
///
/// Mutations are matched by the `"tag"` field of their payload.
#[derive(Default)]
pub struct MockRemote {
    calls: Mutex<Vec<(String, Action, Value)>>,
    behaviors: Mutex<HashMap<String, Behavior>>,
    data: Mutex<HashMap<String, Result<Value, RemoteError>>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    pub entered: Notify,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(MockRemote::default())
    }

    pub fn set_behavior(&self, tag: &str, behavior: Behavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(tag.to_string(), behavior);
    }

    pub fn clear_behavior(&self, tag: &str) {
        self.behaviors.lock().unwrap().remove(tag);
    }

    pub fn set_data(&self, key: &str, result: Result<Value, RemoteError>) {
        self.data.lock().unwrap().insert(key.to_string(), result);
    }

    /// Make every call wait until [`MockRemote::release`] hands out permits.
    pub fn block(&self) -> Arc<Semaphore> {
        let sem = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(Arc::clone(&sem));
        sem
    }

    pub fn calls(&self) -> Vec<(String, Action, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn applied_tags(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|(_, _, payload)| payload["tag"].as_str().map(str::to_string))
            .collect()
    }

    async fn wait_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        self.entered.notify_one();
        if let Some(sem) = gate {
            sem.acquire().await.unwrap().forget();
        }
    }
}

impl RemoteApi for MockRemote {
    fn apply<'a>(
        &'a self,
        entity: &'a str,
        action: Action,
        payload: &'a Value,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((entity.to_string(), action, payload.clone()));
            self.wait_gate().await;

            let tag = payload["tag"].as_str().unwrap_or_default().to_string();
            let behavior = self.behaviors.lock().unwrap().get(&tag).cloned();
            match behavior {
                Some(Behavior::Fail(e)) => Err(e),
                Some(Behavior::Hang) => std::future::pending().await,
                None => Ok(()),
            }
        })
    }

    fn fetch<'a>(&'a self, key: &'a str) -> RemoteFuture<'a, Value> {
        Box::pin(async move {
            self.wait_gate().await;
            self.data
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .unwrap_or_else(|| Err(RemoteError::Permanent(format!("unknown query {key}"))))
        })
    }
}

/// Orchestrator wired to in-memory stores and mocks.
pub struct Harness {
    pub orchestrator: Arc<crate::orchestrator::SyncOrchestrator>,
    pub monitor: Arc<crate::connectivity::ConnectivityMonitor>,
    pub queue: cs_core::SyncQueue,
    pub cache: cs_core::CacheStore,
    pub offline_mode: cs_core::OfflineMode,
    pub probe: Arc<MockProbe>,
    pub remote: Arc<MockRemote>,
}

pub fn harness_with(config: crate::config::SyncConfig) -> Harness {
    let store = Arc::new(cs_core::MemoryStore::new());
    let ns = config.namespace.clone();
    let queue = cs_core::SyncQueue::new(store.clone(), &ns);
    let cache = cs_core::CacheStore::new(store.clone(), ns.clone());
    let offline_mode = cs_core::OfflineMode::new(store, &ns);
    let probe = MockProbe::new(true);
    let monitor = Arc::new(crate::connectivity::ConnectivityMonitor::new(probe.clone()));
    let remote = MockRemote::new();

    let orchestrator = Arc::new(crate::orchestrator::SyncOrchestrator::new(
        queue.clone(),
        cache.clone(),
        offline_mode.clone(),
        Arc::clone(&monitor),
        remote.clone(),
        config,
    ));

    Harness {
        orchestrator,
        monitor,
        queue,
        cache,
        offline_mode,
        probe,
        remote,
    }
}

pub fn harness() -> Harness {
    harness_with(crate::config::SyncConfig::default())
}

/// Enqueue one `members/update` mutation per tag.
pub async fn enqueue_tags(queue: &cs_core::SyncQueue, tags: &[&str]) -> Vec<cs_core::QueueId> {
    let mut ids = Vec::new();
    for tag in tags {
        ids.push(
            queue
                .enqueue("members", Action::Update, serde_json::json!({ "tag": tag }))
                .await
                .unwrap(),
        );
    }
    ids
}
