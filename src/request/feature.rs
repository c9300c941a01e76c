//! Optional request capabilities.

use serde_json::{Map, Value};

use crate::cache::{CacheKey, CacheTime};

/// Capability of a query to be served from and stored into the cache.
pub trait Cacheable {
    /// Cache key identifying the stored response.
    fn cache_key(&self) -> CacheKey;

    /// How long a stored response stays valid. A zero or negative time is
    /// the "do not cache" sentinel.
    fn cache_time(&self) -> CacheTime;
}

/// Capability of a request to be recorded by the profiler.
pub trait Profileable {
    /// Label grouping related profiler entries.
    fn profiler_id(&self) -> &str;

    /// Arbitrary caller-supplied data attached to the profiler entry.
    fn profiler_data(&self) -> Option<Map<String, Value>> {
        None
    }
}
