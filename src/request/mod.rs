//! Request module - queries, commands and their optional capabilities.
//!
//! A request is an opaque operation descriptor: a `request_type` tag used by
//! handlers' `supports` checks, plus a payload that is either a plain JSON
//! value or a zero-argument callback producing one. Requests are immutable
//! after construction.
//!
//! Capabilities are attached via composition, not inheritance: a request
//! *may* be [`Cacheable`] (queries only) and *may* be [`Profileable`], and
//! dispatchers discover this through the `as_cacheable` / `as_profileable`
//! hooks, which default to `None`.
//!
//! # Example
//!
//! ```
//! use cqrs_dispatch::request::{Payload, Query};
//!
//! #[derive(Debug)]
//! struct UserQuery {
//!     id: u64,
//! }
//!
//! impl Query for UserQuery {
//!     fn request_type(&self) -> &str {
//!         "user"
//!     }
//!
//!     fn create_request(&self) -> Payload {
//!         Payload::Value(serde_json::json!({ "id": self.id }))
//!     }
//! }
//! ```

mod feature;
mod prebuilt;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::BoxError;
use crate::tag::short_type_name;

pub use feature::{Cacheable, Profileable};
pub use prebuilt::{CachedDataQuery, ProfiledCachedDataQuery, ProfiledDataCommand};

/// Zero-argument fallible callback payload.
pub type Callback = Arc<dyn Fn() -> std::result::Result<Value, BoxError> + Send + Sync>;

/// Payload carried by a request.
#[derive(Clone)]
pub enum Payload {
    /// An already materialized value.
    Value(Value),
    /// A callback producing the value on demand (invoked by the callback
    /// handlers).
    Callback(Callback),
}

impl Payload {
    /// Materialize the payload, invoking the callback if necessary.
    pub fn resolve(&self) -> std::result::Result<Value, BoxError> {
        match self {
            Payload::Value(value) => Ok(value.clone()),
            Payload::Callback(callback) => callback(),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Payload::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// A read-intent request.
pub trait Query: Send + Sync {
    /// String discriminator used by handlers' `supports` checks.
    fn request_type(&self) -> &str;

    /// Build the request payload.
    fn create_request(&self) -> Payload;

    /// Short concrete type name, recorded by the profiler.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Cache capability, if this query opts into caching.
    fn as_cacheable(&self) -> Option<&dyn Cacheable> {
        None
    }

    /// Profiling capability, if this query opts into profiling.
    fn as_profileable(&self) -> Option<&dyn Profileable> {
        None
    }
}

/// A write/action-intent request. Commands may be profiled but are never
/// cached in this design.
pub trait Command: Send + Sync {
    /// String discriminator used by handlers' `supports` checks.
    fn request_type(&self) -> &str;

    /// Build the request payload.
    fn create_request(&self) -> Payload;

    /// Short concrete type name, recorded by the profiler.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Profiling capability, if this command opts into profiling.
    fn as_profileable(&self) -> Option<&dyn Profileable> {
        None
    }
}

/// The request that initiated the current dispatch call, as seen by
/// decoders' `supports` checks.
#[derive(Clone, Copy)]
pub enum Initiator<'a> {
    /// A query dispatch.
    Query(&'a dyn Query),
    /// A command dispatch.
    Command(&'a dyn Command),
}

impl<'a> Initiator<'a> {
    /// The initiating request's `request_type` discriminator.
    pub fn request_type(&self) -> &str {
        match self {
            Initiator::Query(query) => query.request_type(),
            Initiator::Command(command) => command.request_type(),
        }
    }

    /// Short concrete type name of the initiating request.
    pub fn name(&self) -> &'static str {
        match self {
            Initiator::Query(query) => query.name(),
            Initiator::Command(command) => command.name(),
        }
    }

    /// Cache capability of the initiator. Always `None` for commands.
    pub fn as_cacheable(&self) -> Option<&'a dyn Cacheable> {
        match self {
            Initiator::Query(query) => query.as_cacheable(),
            Initiator::Command(_) => None,
        }
    }

    /// Profiling capability of the initiator.
    pub fn as_profileable(&self) -> Option<&'a dyn Profileable> {
        match self {
            Initiator::Query(query) => query.as_profileable(),
            Initiator::Command(command) => command.as_profileable(),
        }
    }
}

impl fmt::Debug for Initiator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Initiator::Query(query) => write!(f, "Query({})", query.name()),
            Initiator::Command(command) => write!(f, "Command({})", command.name()),
        }
    }
}
