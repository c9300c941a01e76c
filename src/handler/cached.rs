//! Cache-read handler for cacheable queries.

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::handler::{HandlerOutcome, QueryHandler};
use crate::request::Query;

/// Serves cacheable queries from a [`CacheStore`].
///
/// Registered automatically by the query dispatcher when a store is
/// supplied, above the default priority so it outranks ordinary handlers.
/// A cache miss yields "not handled", letting the chain fall through to
/// the real data source.
pub struct CachedQueryHandler {
    store: Arc<dyn CacheStore>,
}

impl CachedQueryHandler {
    /// Create a handler reading from `store`.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }
}

impl QueryHandler for CachedQueryHandler {
    fn supports(&self, query: &dyn Query) -> bool {
        match query.as_cacheable() {
            Some(cacheable) => cacheable.cache_time().should_cache(),
            None => false,
        }
    }

    fn handle(&self, query: &dyn Query) -> HandlerOutcome {
        let cacheable = query.as_cacheable()?;
        let key = cacheable.cache_key();
        let hit = self.store.get(key.hashed_key())?;

        tracing::debug!(key = key.key(), "cache hit");
        Some(Ok(hit))
    }

    fn is_cache_read(&self) -> bool {
        true
    }
}
