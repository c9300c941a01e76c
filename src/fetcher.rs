//! Query dispatch.
//!
//! [`QueryFetcher`] resolves a query through the registered handlers in
//! priority-descending order, runs the raw response through the decoder
//! chain, and transparently reads and writes the cache for queries that
//! opt into caching. Exactly one outcome is produced per call: the decoded
//! response, a handler-reported error, or "no handler used".
//!
//! # Example
//!
//! ```
//! use cqrs_dispatch::fetcher::QueryFetcher;
//! use cqrs_dispatch::handler::CallbackQueryHandler;
//! use cqrs_dispatch::request::{Payload, Query};
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! let fetcher = QueryFetcher::builder()
//!     .handler(CallbackQueryHandler)
//!     .build();
//!
//! struct NumbersQuery;
//!
//! impl Query for NumbersQuery {
//!     fn request_type(&self) -> &str {
//!         "callable"
//!     }
//!
//!     fn create_request(&self) -> Payload {
//!         Payload::Callback(Arc::new(|| Ok(json!([1, 2, 3]))))
//!     }
//! }
//!
//! let response = fetcher.fetch(&NumbersQuery).unwrap();
//! assert_eq!(response, json!([1, 2, 3]));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde_json::{json, Value};

use crate::cache::CacheStore;
use crate::decoder::ResponseDecoder;
use crate::dispatch::{self, DispatchContext, ImpureCacheHook};
use crate::error::{DispatchError, Result};
use crate::handler::{CachedQueryHandler, QueryHandler};
use crate::priority::{PrioritizedRegistry, PRIORITY_HIGH, PRIORITY_MEDIUM};
use crate::profiler::{ItemType, ProfilerBag};
use crate::request::{Cacheable, Initiator, Query};

type HandlerRegistry = PrioritizedRegistry<Arc<dyn QueryHandler>>;
type DecoderRegistry = PrioritizedRegistry<Arc<dyn ResponseDecoder>>;

/// Builder for [`QueryFetcher`].
///
/// Handlers and decoders default to [`PRIORITY_MEDIUM`]; supplying a cache
/// store registers the built-in [`CachedQueryHandler`] at [`PRIORITY_HIGH`],
/// above every default-priority handler but below anything registered at
/// `PRIORITY_HIGHEST`.
pub struct QueryFetcherBuilder {
    handlers: HandlerRegistry,
    decoders: DecoderRegistry,
    cache: Option<Arc<dyn CacheStore>>,
    profiler_bag: Option<Arc<ProfilerBag>>,
}

impl QueryFetcherBuilder {
    fn new() -> Self {
        Self {
            handlers: PrioritizedRegistry::new(),
            decoders: PrioritizedRegistry::new(),
            cache: None,
            profiler_bag: None,
        }
    }

    /// Register a handler at the default priority.
    pub fn handler(self, handler: impl QueryHandler + 'static) -> Self {
        self.shared_handler(Arc::new(handler), PRIORITY_MEDIUM)
    }

    /// Register a handler at an explicit priority.
    pub fn handler_with_priority(self, handler: impl QueryHandler + 'static, priority: i32) -> Self {
        self.shared_handler(Arc::new(handler), priority)
    }

    /// Register an already shared handler at an explicit priority.
    pub fn shared_handler(mut self, handler: Arc<dyn QueryHandler>, priority: i32) -> Self {
        self.handlers.add((handler, priority));
        self
    }

    /// Register a decoder at the default priority.
    pub fn decoder(self, decoder: impl ResponseDecoder + 'static) -> Self {
        self.shared_decoder(Arc::new(decoder), PRIORITY_MEDIUM)
    }

    /// Register a decoder at an explicit priority.
    pub fn decoder_with_priority(self, decoder: impl ResponseDecoder + 'static, priority: i32) -> Self {
        self.shared_decoder(Arc::new(decoder), priority)
    }

    /// Register an already shared decoder at an explicit priority.
    pub fn shared_decoder(mut self, decoder: Arc<dyn ResponseDecoder>, priority: i32) -> Self {
        self.decoders.add((decoder, priority));
        self
    }

    /// Supply a cache store; enables caching and the built-in cache-read
    /// handler.
    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Supply a profiler bag; enables profiling for profileable queries.
    pub fn profiler_bag(mut self, profiler_bag: Arc<ProfilerBag>) -> Self {
        self.profiler_bag = Some(profiler_bag);
        self
    }

    /// Build the fetcher. The built-in cache-read handler is appended last
    /// so custom handlers registered at the same priority outrank it.
    pub fn build(mut self) -> QueryFetcher {
        if let Some(cache) = &self.cache {
            let cached = Arc::new(CachedQueryHandler::new(Arc::clone(cache))) as Arc<dyn QueryHandler>;
            self.handlers.add((cached, PRIORITY_HIGH));
        }

        QueryFetcher {
            handlers: RwLock::new(self.handlers),
            decoders: RwLock::new(self.decoders),
            cache: self.cache,
            cache_enabled: AtomicBool::new(true),
            profiler_bag: self.profiler_bag,
        }
    }
}

/// Dispatches queries to the first supporting handler and decodes the
/// result.
pub struct QueryFetcher {
    handlers: RwLock<HandlerRegistry>,
    decoders: RwLock<DecoderRegistry>,
    cache: Option<Arc<dyn CacheStore>>,
    cache_enabled: AtomicBool,
    profiler_bag: Option<Arc<ProfilerBag>>,
}

impl QueryFetcher {
    /// Start building a fetcher.
    pub fn builder() -> QueryFetcherBuilder {
        QueryFetcherBuilder::new()
    }

    fn handlers(&self) -> RwLockReadGuard<'_, HandlerRegistry> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn handlers_mut(&self) -> RwLockWriteGuard<'_, HandlerRegistry> {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn decoders(&self) -> RwLockReadGuard<'_, DecoderRegistry> {
        self.decoders.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler after construction.
    pub fn add_handler(&self, handler: impl QueryHandler + 'static, priority: i32) {
        self.add_shared_handler(Arc::new(handler), priority);
    }

    /// Register an already shared handler after construction.
    pub fn add_shared_handler(&self, handler: Arc<dyn QueryHandler>, priority: i32) {
        self.handlers_mut().add((handler, priority));
    }

    /// Register a decoder after construction.
    pub fn add_decoder(&self, decoder: impl ResponseDecoder + 'static, priority: i32) {
        self.add_shared_decoder(Arc::new(decoder), priority);
    }

    /// Register an already shared decoder after construction.
    pub fn add_shared_decoder(&self, decoder: Arc<dyn ResponseDecoder>, priority: i32) {
        self.decoders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add((decoder, priority));
    }

    /// Names of every registered handler, in priority order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers().iter().map(|handler| handler.name()).collect()
    }

    /// The profiler bag this fetcher records into, if any.
    pub fn profiler_bag(&self) -> Option<&Arc<ProfilerBag>> {
        self.profiler_bag.as_ref()
    }

    /// Dispatch a query, consulting the cache for cacheable queries.
    pub fn fetch(&self, query: &dyn Query) -> Result<Value> {
        self.fetch_with_filter(query, None)
    }

    /// Dispatch a query, skipping the built-in cache-read handler. The
    /// fresh result is still written to the cache afterwards.
    pub fn fetch_fresh(&self, query: &dyn Query) -> Result<Value> {
        self.fetch_with_filter(query, Some(&|handler: &Arc<dyn QueryHandler>| {
            !handler.is_cache_read()
        }))
    }

    fn fetch_with_filter(
        &self,
        query: &dyn Query,
        filter: Option<&dyn Fn(&Arc<dyn QueryHandler>) -> bool>,
    ) -> Result<Value> {
        let mut ctx = DispatchContext::new(Initiator::Query(query));
        let bag = self.profiler_bag.as_deref();

        // Snapshots keep the registries unlocked while handlers and
        // decoders run, so a decoder may reenter this fetcher.
        let handlers = match filter {
            Some(filter) => self.handlers().to_vec_filtered(filter),
            None => self.handlers().to_vec(),
        };
        let decoders = self.decoders().to_vec();

        for handler in &handlers {
            if handler.supports(query) {
                handler.prepare(query);
            }
        }

        dispatch::start_profile(bag, &mut ctx, ItemType::Query);

        for handler in &handlers {
            if handler.is_cache_read() && !self.is_cache_enabled() {
                continue;
            }
            if !handler.supports(query) {
                continue;
            }

            let Some(outcome) = handler.handle(query) else {
                continue;
            };

            match outcome {
                Ok(response) => {
                    ctx.record_success(handler.name(), handler.is_cache_read(), response)
                }
                Err(error) => ctx.record_error(handler.name(), handler.is_cache_read(), error),
            }

            tracing::debug!(
                query = query.name(),
                handler = handler.name(),
                "query handled"
            );
            dispatch::record_handled_step(bag, &ctx);

            if ctx.error().is_none() {
                dispatch::decode_response(
                    &mut ctx,
                    &decoders,
                    bag,
                    &FetcherImpureCache { fetcher: self },
                );
            }

            dispatch::finish_profile(bag, &ctx);

            if let Some(error) = ctx.take_error() {
                return Err(DispatchError::Handler {
                    handler: handler.name().to_string(),
                    source: error,
                });
            }

            let response = ctx.take_response().unwrap_or(Value::Null);
            if let Some(cacheable) = query.as_cacheable() {
                if self.should_cache_response(&ctx) {
                    self.cache_success(cacheable, &mut ctx, &response);
                }
            }

            return Ok(response);
        }

        Err(DispatchError::NoHandlerUsed {
            request_type: query.request_type().to_string(),
            handlers: self
                .handler_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }

    fn should_cache_response(&self, ctx: &DispatchContext<'_>) -> bool {
        let from_cache = ctx
            .used_handler()
            .map(|handler| handler.is_cache_read)
            .unwrap_or(false);

        !from_cache && !ctx.is_already_cached()
    }

    fn cache_success(&self, cacheable: &dyn Cacheable, ctx: &mut DispatchContext<'_>, response: &Value) {
        let Some(cache) = &self.cache else { return };
        if !self.is_cache_enabled() {
            return;
        }
        let cache_time = cacheable.cache_time();
        if !cache_time.should_cache() {
            return;
        }

        let bag = self.profiler_bag.as_deref();
        dispatch::record_debug_step(bag, ctx.key(), || json!({ "cache response": response }));

        let key = cacheable.cache_key();
        let stored = cache.set(
            key.hashed_key(),
            response.clone(),
            Duration::from_secs(cache_time.as_seconds() as u64),
        );
        ctx.set_already_cached();

        if !stored {
            tracing::warn!(key = key.key(), "cache write failed");
        }

        if ctx.initiator().as_profileable().is_some() {
            if let Some(bag) = bag {
                bag.update(ctx.key(), |item| {
                    item.set_is_stored_in_cache(stored, Some(cache_time))
                });
            }
        }
    }

    /// Let the built-in cache-read handler participate again and allow
    /// cache writes.
    pub fn enable_cache(&self) {
        self.cache_enabled.store(true, Ordering::SeqCst);
    }

    /// Skip the built-in cache-read handler and suppress cache writes. The
    /// handler stays registered; toggling never re-sorts the registry.
    pub fn disable_cache(&self) {
        self.cache_enabled.store(false, Ordering::SeqCst);
    }

    /// Whether caching currently participates in dispatch.
    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled.load(Ordering::SeqCst)
    }

    /// Delete the cache entry of a cacheable query. Returns false for
    /// non-cacheable queries and absent entries.
    pub fn invalidate_query_cache(&self, query: &dyn Query) -> bool {
        match query.as_cacheable() {
            Some(cacheable) => self.invalidate_cache_item(cacheable.cache_key().hashed_key()),
            None => false,
        }
    }

    /// Delete a cache entry by its hashed key. Profiler items recorded for
    /// that key are reset to "not stored" so the bag stays consistent with
    /// the store.
    pub fn invalidate_cache_item(&self, hashed_key: &str) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        if !cache.has(hashed_key) {
            return false;
        }

        let deleted = cache.delete(hashed_key);
        tracing::debug!(key = hashed_key, deleted, "cache entry invalidated");

        if let Some(bag) = &self.profiler_bag {
            bag.update_all(|item| {
                let matches = item
                    .cache_key()
                    .is_some_and(|key| key.hashed_key() == hashed_key);
                if matches {
                    item.set_is_stored_in_cache(false, None);
                }
            });
        }

        deleted
    }
}

struct FetcherImpureCache<'f> {
    fetcher: &'f QueryFetcher,
}

impl ImpureCacheHook for FetcherImpureCache<'_> {
    fn cache_before_impure_decode(&self, ctx: &mut DispatchContext<'_>, current: &Value) {
        let Some(cacheable) = ctx.initiator().as_cacheable() else {
            return;
        };
        if self.fetcher.should_cache_response(ctx) {
            self.fetcher.cache_success(cacheable, ctx, current);
        }
    }
}
