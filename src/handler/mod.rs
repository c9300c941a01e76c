//! Handler module - request handling contracts and built-in handlers.
//!
//! Handlers resolve a request to a raw response. During dispatch every
//! supporting handler first gets a `prepare` pass (side effects only, e.g.
//! signing the request), then the first supporting handler whose `handle`
//! returns an outcome wins - lower-priority handlers are never invoked once
//! one reports handled, success or failure.
//!
//! Built-ins:
//! - [`CallbackQueryHandler`] / [`CallbackCommandHandler`] - invoke a
//!   request's callback payload.
//! - [`CachedQueryHandler`] - serves cacheable queries from the store
//!   (registered automatically by the query dispatcher when a store is
//!   supplied).

mod cached;
mod callback;

use serde_json::Value;

use crate::error::BoxError;
use crate::request::{Command, Query};
use crate::tag::short_type_name;

pub use cached::CachedQueryHandler;
pub use callback::{CallbackCommandHandler, CallbackQueryHandler};

/// Outcome of a single `handle` attempt.
///
/// `None` means "not handled" - the dispatcher continues with the next
/// handler in priority order. `Some` is final for the dispatch call.
pub type HandlerOutcome = Option<std::result::Result<Value, BoxError>>;

/// Resolves a query to a raw response.
pub trait QueryHandler: Send + Sync {
    /// Short concrete type name, recorded in profiler descriptors.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Whether this handler applies to the query.
    fn supports(&self, query: &dyn Query) -> bool;

    /// Side-effecting preparation pass; runs for *every* supporting handler
    /// before any handler runs `handle`.
    fn prepare(&self, query: &dyn Query) {
        let _ = query;
    }

    /// Attempt to handle the query.
    fn handle(&self, query: &dyn Query) -> HandlerOutcome;

    /// True only for the built-in cache-read handler; used by the fresh
    /// fetch filter and the should-cache policy.
    fn is_cache_read(&self) -> bool {
        false
    }
}

/// Resolves a command to a raw response.
pub trait CommandHandler: Send + Sync {
    /// Short concrete type name, recorded in profiler descriptors.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Whether this handler applies to the command.
    fn supports(&self, command: &dyn Command) -> bool;

    /// Side-effecting preparation pass; runs for *every* supporting handler
    /// before any handler runs `handle`.
    fn prepare(&self, command: &dyn Command) {
        let _ = command;
    }

    /// Attempt to handle the command.
    fn handle(&self, command: &dyn Command) -> HandlerOutcome;
}
