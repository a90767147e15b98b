// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable key/value storage abstraction.
//!
//! Every piece of offline state is kept as string-serialized JSON under a
//! namespaced key. The [`KeyValueStore`] trait abstracts over the backend:
//! - [`SqliteStore`] persists to a SQLite file and survives restarts
//! - [`MemoryStore`] keeps everything in a map, for tests and ephemeral sessions

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::error::{Error, Result};

/// Boxed future returned by [`KeyValueStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Edit applied by [`KeyValueStore::update`]: receives the current value and
/// returns the value to write, or `None` to leave the key untouched.
pub type UpdateFn<'a> = Box<dyn FnOnce(Option<String>) -> Result<Option<String>> + Send + 'a>;

/// Durable string key/value storage.
///
/// Implementations must be safe to share between tasks.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    /// Create or overwrite the value stored under `key`.
    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;

    /// List every key starting with `prefix`, in lexicographic order.
    fn list_keys<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, Vec<String>>;

    /// Read, edit and write back `key` as one atomic step.
    ///
    /// No other writer, in this process or another one sharing the same
    /// backing file, can interleave between the read and the write. If `edit`
    /// fails nothing is written.
    fn update<'a>(&'a self, key: &'a str, edit: UpdateFn<'a>) -> StoreFuture<'a, ()>;
}

/// Default prefix for every key owned by clubsync.
pub const DEFAULT_PREFIX: &str = "@clubsync/";

/// Key namespace shared by the stores so their keys never collide with
/// unrelated application state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    /// Create a namespace with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Namespace {
            prefix: prefix.into(),
        }
    }

    /// The raw prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full storage key for a namespaced name.
    pub fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Prefix shared by all cache entries.
    pub fn cache_prefix(&self) -> String {
        self.key("cache/")
    }

    /// Storage key of a single cache entry.
    pub fn cache_key(&self, key: &str) -> String {
        format!("{}{}", self.cache_prefix(), key)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Namespace::new(DEFAULT_PREFIX)
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move { Ok(self.entries().get(key).cloned()) })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.entries().insert(key.to_string(), value);
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.entries().remove(key);
            Ok(())
        })
    }

    fn list_keys<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, Vec<String>> {
        Box::pin(async move {
            Ok(self
                .entries()
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect())
        })
    }

    fn update<'a>(&'a self, key: &'a str, edit: UpdateFn<'a>) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut entries = self.entries();
            if let Some(value) = edit(entries.get(key).cloned())? {
                entries.insert(key.to_string(), value);
            }
            Ok(())
        })
    }
}

/// SQL schema for the key/value table.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// SQLite-backed store.
///
/// Statements are short and run inline; the connection is guarded by a
/// mutex so the store can be shared across tasks. Several stores (and
/// processes) may open the same file: [`KeyValueStore::update`] runs in an
/// immediate transaction, which takes the database write lock before reading.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a store at the given path, creating the file and schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;

        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::Storage("sqlite connection poisoned".to_string()))?;
        Ok(f(&conn)?)
    }

    fn read_modify_write(&self, key: &str, edit: UpdateFn<'_>) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| Error::Storage("sqlite connection poisoned".to_string()))?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = tx
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        // An error returns before commit and the transaction rolls back on drop
        if let Some(value) = edit(current)? {
            tx.execute(UPSERT, params![key, value])?;
        }
        tx.commit()?;
        Ok(())
    }
}

const UPSERT: &str = "INSERT INTO kv (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value";

impl KeyValueStore for SqliteStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            self.with_conn(|conn| {
                conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()
            })
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.with_conn(|conn| conn.execute(UPSERT, params![key, value]))?;
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.with_conn(|conn| conn.execute("DELETE FROM kv WHERE key = ?1", params![key]))?;
            Ok(())
        })
    }

    fn list_keys<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, Vec<String>> {
        Box::pin(async move {
            self.with_conn(|conn| {
                // substr comparison avoids LIKE wildcard escaping in user keys
                let mut stmt = conn.prepare(
                    "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
                )?;
                let rows = stmt.query_map(params![prefix], |row| row.get::<_, String>(0))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
        })
    }

    fn update<'a>(&'a self, key: &'a str, edit: UpdateFn<'a>) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.read_modify_write(key, edit) })
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
