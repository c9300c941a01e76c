//! Pre-built request types for callback-backed data.
//!
//! These cover the common case of "fetch this lazily computed value, cached
//! and/or profiled" without writing a request type by hand. All of them use
//! the `"callable"` request type, so they are served by the callback
//! handlers.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::cache::{CacheKey, CacheTime};
use crate::error::BoxError;
use crate::request::{Cacheable, Callback, Command, Payload, Profileable, Query};

/// A cacheable query producing its data from a callback.
pub struct CachedDataQuery {
    create_data: Callback,
    cache_key: CacheKey,
    cache_time: CacheTime,
}

impl CachedDataQuery {
    /// Create a cacheable callback query.
    pub fn new<F>(create_data: F, cache_key: CacheKey, cache_time: CacheTime) -> Self
    where
        F: Fn() -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            create_data: Arc::new(create_data),
            cache_key,
            cache_time,
        }
    }
}

impl Query for CachedDataQuery {
    fn request_type(&self) -> &str {
        "callable"
    }

    fn create_request(&self) -> Payload {
        Payload::Callback(Arc::clone(&self.create_data))
    }

    fn as_cacheable(&self) -> Option<&dyn Cacheable> {
        Some(self)
    }
}

impl Cacheable for CachedDataQuery {
    fn cache_key(&self) -> CacheKey {
        self.cache_key.clone()
    }

    fn cache_time(&self) -> CacheTime {
        self.cache_time
    }
}

/// A cacheable and profileable query producing its data from a callback.
pub struct ProfiledCachedDataQuery {
    inner: CachedDataQuery,
    profiler_id: String,
    profiler_data: Option<Map<String, Value>>,
}

impl ProfiledCachedDataQuery {
    /// Create a cacheable, profileable callback query.
    pub fn new<F>(
        create_data: F,
        cache_key: CacheKey,
        cache_time: CacheTime,
        profiler_id: impl Into<String>,
        profiler_data: Option<Map<String, Value>>,
    ) -> Self
    where
        F: Fn() -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            inner: CachedDataQuery::new(create_data, cache_key, cache_time),
            profiler_id: profiler_id.into(),
            profiler_data,
        }
    }
}

impl Query for ProfiledCachedDataQuery {
    fn request_type(&self) -> &str {
        self.inner.request_type()
    }

    fn create_request(&self) -> Payload {
        self.inner.create_request()
    }

    fn as_cacheable(&self) -> Option<&dyn Cacheable> {
        Some(&self.inner)
    }

    fn as_profileable(&self) -> Option<&dyn Profileable> {
        Some(self)
    }
}

impl Profileable for ProfiledCachedDataQuery {
    fn profiler_id(&self) -> &str {
        &self.profiler_id
    }

    fn profiler_data(&self) -> Option<Map<String, Value>> {
        self.profiler_data.clone()
    }
}

/// A profileable command producing its data from a callback.
pub struct ProfiledDataCommand {
    create_data: Callback,
    profiler_id: String,
    profiler_data: Option<Map<String, Value>>,
}

impl ProfiledDataCommand {
    /// Create a profileable callback command.
    pub fn new<F>(
        create_data: F,
        profiler_id: impl Into<String>,
        profiler_data: Option<Map<String, Value>>,
    ) -> Self
    where
        F: Fn() -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            create_data: Arc::new(create_data),
            profiler_id: profiler_id.into(),
            profiler_data,
        }
    }
}

impl Command for ProfiledDataCommand {
    fn request_type(&self) -> &str {
        "callable"
    }

    fn create_request(&self) -> Payload {
        Payload::Callback(Arc::clone(&self.create_data))
    }

    fn as_profileable(&self) -> Option<&dyn Profileable> {
        Some(self)
    }
}

impl Profileable for ProfiledDataCommand {
    fn profiler_id(&self) -> &str {
        &self.profiler_id
    }

    fn profiler_data(&self) -> Option<Map<String, Value>> {
        self.profiler_data.clone()
    }
}
