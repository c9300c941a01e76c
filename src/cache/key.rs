//! Cache key and cache time value objects.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Opaque cache key, hashed to a stable string.
///
/// The hashed form is what reaches the store, so two keys built from the
/// same input always address the same entry, across processes and runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
    key: String,
    hashed: String,
}

impl CacheKey {
    /// Create a key from an arbitrary string.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let hashed = hex::encode(Sha256::digest(key.as_bytes()));
        Self { key, hashed }
    }

    /// The original, human-readable key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stable hashed form used as the store key.
    pub fn hashed_key(&self) -> &str {
        &self.hashed
    }
}

/// Cache lifetime in seconds. Zero or negative means "do not cache".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheTime {
    seconds: i64,
}

impl CacheTime {
    /// The "do not cache" sentinel.
    pub const fn no_cache() -> Self {
        Self { seconds: 0 }
    }

    /// A lifetime of the given number of seconds.
    pub const fn seconds(seconds: i64) -> Self {
        Self { seconds }
    }

    /// Sixty seconds.
    pub const fn one_minute() -> Self {
        Self::seconds(60)
    }

    /// One hour.
    pub const fn one_hour() -> Self {
        Self::seconds(3600)
    }

    /// The lifetime in seconds.
    pub fn as_seconds(&self) -> i64 {
        self.seconds
    }

    /// True when a response with this lifetime may be cached at all.
    pub fn should_cache(&self) -> bool {
        self.seconds > 0
    }
}
