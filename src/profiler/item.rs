//! A single profiled dispatch.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cache::{CacheKey, CacheTime};

/// Which dispatcher produced the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Query,
    Command,
}

/// Everything recorded about one dispatch of a profileable request.
///
/// Dispatchers create the item when the pipeline starts and mutate it in
/// place (through the bag) as the dispatch progresses; consumers read the
/// finished items after the fact.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilerItem {
    profiler_id: String,
    item_type: ItemType,
    request_name: String,
    additional_data: Map<String, Value>,
    handled_by: String,
    decoded_by: Vec<String>,
    response: Option<Value>,
    error: Option<String>,
    cache_key: Option<CacheKey>,
    cache_time: Option<i64>,
    is_loaded_from_cache: Option<bool>,
    is_stored_in_cache: Option<bool>,
    duration_ms: Option<u64>,
}

impl ProfilerItem {
    pub(crate) fn new(
        profiler_id: String,
        item_type: ItemType,
        request_name: &str,
        additional_data: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            profiler_id,
            item_type,
            request_name: request_name.to_string(),
            additional_data: additional_data.unwrap_or_default(),
            handled_by: String::new(),
            decoded_by: Vec::new(),
            response: None,
            error: None,
            cache_key: None,
            cache_time: None,
            is_loaded_from_cache: None,
            is_stored_in_cache: None,
            duration_ms: None,
        }
    }

    /// Caller-chosen label grouping related items.
    pub fn profiler_id(&self) -> &str {
        &self.profiler_id
    }

    /// Whether a query or a command produced this item.
    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    /// Short type name of the dispatched request.
    pub fn request_name(&self) -> &str {
        &self.request_name
    }

    /// Caller-supplied data plus any verbose/debug step buckets.
    pub fn additional_data(&self) -> &Map<String, Value> {
        &self.additional_data
    }

    /// Descriptor of the handler that produced the raw response.
    pub fn handled_by(&self) -> &str {
        &self.handled_by
    }

    /// Descriptors of the decoders that ran, in execution order.
    pub fn decoded_by(&self) -> &[String] {
        &self.decoded_by
    }

    /// Final response of the dispatch, if it succeeded.
    pub fn response(&self) -> Option<&Value> {
        self.response.as_ref()
    }

    /// Error message, if the dispatch failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Cache key of the query, when it was cacheable.
    pub fn cache_key(&self) -> Option<&CacheKey> {
        self.cache_key.as_ref()
    }

    /// Lifetime in seconds of the cache write, when one happened.
    pub fn cache_time(&self) -> Option<i64> {
        self.cache_time
    }

    /// Whether the response came from the cache-read handler. `None` for
    /// requests that are not cacheable.
    pub fn is_loaded_from_cache(&self) -> Option<bool> {
        self.is_loaded_from_cache
    }

    /// Whether this dispatch wrote the response to the cache and the entry
    /// has not been invalidated since. `None` for requests that are not
    /// cacheable.
    pub fn is_stored_in_cache(&self) -> Option<bool> {
        self.is_stored_in_cache
    }

    /// Wall-clock duration of the dispatch.
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    pub(crate) fn set_handled_by(&mut self, handled_by: String) {
        self.handled_by = handled_by;
    }

    pub(crate) fn add_decoded_by(&mut self, descriptor: String) {
        self.decoded_by.push(descriptor);
    }

    pub(crate) fn set_response(&mut self, response: Value) {
        self.response = Some(response);
    }

    pub(crate) fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }

    pub(crate) fn set_cache_key(&mut self, cache_key: CacheKey) {
        self.cache_key = Some(cache_key);
    }

    pub(crate) fn set_is_loaded_from_cache(&mut self, loaded: bool) {
        self.is_loaded_from_cache = Some(loaded);
    }

    pub(crate) fn set_is_stored_in_cache(&mut self, stored: bool, cache_time: Option<CacheTime>) {
        self.is_stored_in_cache = Some(stored);
        self.cache_time = cache_time.map(|time| time.as_seconds());
    }

    pub(crate) fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = Some(duration_ms);
    }

    /// Append a step to the named bucket, creating the bucket as an array
    /// on first use.
    pub(crate) fn push_step(&mut self, bucket: &str, step: Value) {
        match self.additional_data.get_mut(bucket) {
            Some(Value::Array(steps)) => steps.push(step),
            _ => {
                self.additional_data
                    .insert(bucket.to_string(), Value::Array(vec![step]));
            }
        }
    }
}
