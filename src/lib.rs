//! # cqrs-dispatch
//!
//! CQRS-style dispatch for queries and commands with priority-ordered
//! handler resolution, a chained response decoder pipeline, transparent
//! caching for cacheable queries and opt-in per-dispatch profiling.
//!
//! ## Architecture
//!
//! - **Handlers**: the first supporting handler (priority-descending)
//!   produces the raw response; success or failure, resolution stops there
//! - **Decoders**: every supporting decoder transforms the response in
//!   turn; a `Final` result short-circuits the chain
//! - **Cache**: cacheable queries are served from a store by a built-in
//!   handler and written back after decoding
//! - **Profiler**: profileable requests record one item per dispatch,
//!   with optional verbose/debug step traces
//!
//! ## Example
//!
//! ```
//! use cqrs_dispatch::cache::{CacheKey, CacheTime, InMemoryCacheStore};
//! use cqrs_dispatch::handler::CallbackQueryHandler;
//! use cqrs_dispatch::request::CachedDataQuery;
//! use cqrs_dispatch::QueryFetcher;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let fetcher = QueryFetcher::builder()
//!     .handler(CallbackQueryHandler)
//!     .cache(Arc::new(InMemoryCacheStore::new()))
//!     .build();
//!
//! let query = CachedDataQuery::new(
//!     || Ok(json!(["alice", "bob"])),
//!     CacheKey::new("users:all"),
//!     CacheTime::one_minute(),
//! );
//!
//! let users = fetcher.fetch(&query).unwrap();
//! assert_eq!(users, json!(["alice", "bob"]));
//!
//! // The second fetch is served by the built-in cache-read handler.
//! assert_eq!(fetcher.fetch(&query).unwrap(), users);
//! ```

pub mod cache;
pub mod decoder;
pub mod error;
pub mod fetcher;
pub mod handler;
pub mod priority;
pub mod profiler;
pub mod request;
pub mod sender;
pub mod tag;

mod dispatch;

pub use cache::{CacheKey, CacheTime};
pub use error::{BoxError, DispatchError, Result};
pub use fetcher::{QueryFetcher, QueryFetcherBuilder};
pub use sender::{CommandSender, CommandSenderBuilder};
