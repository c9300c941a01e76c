//! Cache store contract and the in-memory reference implementation.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;

/// Key/value store with TTL, consumed by the query dispatcher.
///
/// Keys are pre-hashed strings (see [`crate::cache::CacheKey`]); the store
/// owns expiry enforcement. Implementations must tolerate interleaved reads
/// and writes from the same call stack (a decoder may reenter the
/// dispatcher).
pub trait CacheStore: Send + Sync {
    /// True when a live (non-expired) entry exists under `key`.
    fn has(&self, key: &str) -> bool;

    /// Fetch the live entry under `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key` for `ttl`. Returns false when the write
    /// could not be performed; the dispatcher records that in the profiler
    /// but never treats it as an error.
    fn set(&self, key: &str, value: Value, ttl: Duration) -> bool;

    /// Delete the entry under `key`. Returns false when nothing was deleted.
    fn delete(&self, key: &str) -> bool;
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Process-local [`CacheStore`] backed by a `HashMap`.
///
/// Expired entries are dropped lazily on access.
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> bool {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries().insert(key.to_string(), entry);
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries().remove(key).is_some()
    }
}
