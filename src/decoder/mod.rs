//! Decoder module - chained response transformation.
//!
//! After a handler produces a raw response, the dispatcher runs it through
//! every registered decoder that supports it, in priority-descending order.
//! Each decoder either continues the chain with a transformed value or ends
//! it with a final one:
//!
//! - [`Decoded::Continue`] feeds the value to the next supporting decoder.
//! - [`Decoded::Final`] unwraps the value and stops the chain immediately;
//!   no further decoder runs, regardless of priority.
//!
//! A decoder marked *impure* declares that `decode` has side effects, which
//! forces the query dispatcher to cache the pre-decode value before the
//! decoder runs (so the cache never holds an impure transformation).

mod callback;

use serde_json::Value;

use crate::request::Initiator;
use crate::tag::short_type_name;

pub use callback::CallbackResponseDecoder;

/// Outcome of a single decode step.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Continue the chain with this value.
    Continue(Value),
    /// Stop the chain; this is the final value.
    Final(Value),
}

impl Decoded {
    /// Unwrap the carried value, discarding the continue/final distinction.
    pub fn into_value(self) -> Value {
        match self {
            Decoded::Continue(value) | Decoded::Final(value) => value,
        }
    }
}

/// Transforms a raw or intermediate response.
pub trait ResponseDecoder: Send + Sync {
    /// Short concrete type name, recorded in profiler descriptors.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Whether `decode` has side effects requiring the pre-decode response
    /// to be cached first (query dispatch only).
    fn is_impure(&self) -> bool {
        false
    }

    /// Whether this decoder applies to the current response.
    fn supports(&self, response: &Value, initiator: Initiator<'_>) -> bool;

    /// Transform the response.
    fn decode(&self, response: Value) -> Decoded;
}
