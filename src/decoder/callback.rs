//! Closure-backed decoder.

use serde_json::Value;

use crate::decoder::{Decoded, ResponseDecoder};
use crate::request::Initiator;

type SupportsFn = dyn Fn(&Value, Initiator<'_>) -> bool + Send + Sync;
type DecodeFn = dyn Fn(Value) -> Decoded + Send + Sync;

/// Adapts a pair of closures into a [`ResponseDecoder`].
///
/// # Example
///
/// ```
/// use cqrs_dispatch::decoder::{CallbackResponseDecoder, Decoded, ResponseDecoder};
/// use serde_json::{json, Value};
///
/// let decoder = CallbackResponseDecoder::new(
///     |response, _initiator| response.is_string(),
///     |response| Decoded::Continue(json!(format!("decoded:{}", response.as_str().unwrap_or("")))),
/// );
///
/// assert!(!decoder.is_impure());
/// assert_eq!(decoder.decode(json!("data")), Decoded::Continue(json!("decoded:data")));
/// ```
pub struct CallbackResponseDecoder {
    supports: Box<SupportsFn>,
    decode: Box<DecodeFn>,
    impure: bool,
}

impl CallbackResponseDecoder {
    /// Create a pure decoder from a supports predicate and a decode closure.
    pub fn new<S, D>(supports: S, decode: D) -> Self
    where
        S: Fn(&Value, Initiator<'_>) -> bool + Send + Sync + 'static,
        D: Fn(Value) -> Decoded + Send + Sync + 'static,
    {
        Self {
            supports: Box::new(supports),
            decode: Box::new(decode),
            impure: false,
        }
    }

    /// Mark this decoder as impure (its decode step has side effects).
    pub fn impure(mut self) -> Self {
        self.impure = true;
        self
    }
}

impl ResponseDecoder for CallbackResponseDecoder {
    fn is_impure(&self) -> bool {
        self.impure
    }

    fn supports(&self, response: &Value, initiator: Initiator<'_>) -> bool {
        (self.supports)(response, initiator)
    }

    fn decode(&self, response: Value) -> Decoded {
        (self.decode)(response)
    }
}
