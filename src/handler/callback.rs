//! Built-in handlers invoking a request's callback payload.

use crate::handler::{CommandHandler, HandlerOutcome, QueryHandler};
use crate::request::{Command, Payload, Query};

/// Request types served by the callback handlers.
const CALLBACK_REQUEST_TYPES: &[&str] = &["callable", "callback", "closure"];

fn supports_callback(request_type: &str) -> bool {
    CALLBACK_REQUEST_TYPES.contains(&request_type)
}

fn invoke(payload: Payload, handler: &'static str) -> HandlerOutcome {
    match payload {
        Payload::Callback(callback) => Some(callback()),
        Payload::Value(_) => Some(Err(format!(
            "{handler} expects a callback payload, got a plain value"
        )
        .into())),
    }
}

/// Handles queries whose payload is a zero-argument callback.
pub struct CallbackQueryHandler;

impl QueryHandler for CallbackQueryHandler {
    fn supports(&self, query: &dyn Query) -> bool {
        supports_callback(query.request_type())
    }

    fn handle(&self, query: &dyn Query) -> HandlerOutcome {
        invoke(query.create_request(), "CallbackQueryHandler")
    }
}

/// Handles commands whose payload is a zero-argument callback.
pub struct CallbackCommandHandler;

impl CommandHandler for CallbackCommandHandler {
    fn supports(&self, command: &dyn Command) -> bool {
        supports_callback(command.request_type())
    }

    fn handle(&self, command: &dyn Command) -> HandlerOutcome {
        invoke(command.create_request(), "CallbackCommandHandler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct TypedQuery {
        request_type: &'static str,
        payload: Payload,
    }

    impl Query for TypedQuery {
        fn request_type(&self) -> &str {
            self.request_type
        }

        fn create_request(&self) -> Payload {
            self.payload.clone()
        }
    }

    #[test]
    fn test_supports_callback_request_types() {
        let handler = CallbackQueryHandler;

        for request_type in ["callable", "callback", "closure"] {
            let query = TypedQuery {
                request_type,
                payload: Payload::Value(Value::Null),
            };
            assert!(handler.supports(&query), "{request_type} must be supported");
        }

        let other = TypedQuery {
            request_type: "dummy",
            payload: Payload::Value(Value::Null),
        };
        assert!(!handler.supports(&other));
    }

    #[test]
    fn test_invokes_callback() {
        let handler = CallbackQueryHandler;
        let query = TypedQuery {
            request_type: "callable",
            payload: Payload::Callback(Arc::new(|| Ok(json!("computed")))),
        };

        let outcome = handler.handle(&query).expect("handled");
        assert_eq!(outcome.unwrap(), json!("computed"));
    }

    #[test]
    fn test_callback_error_becomes_error_outcome() {
        let handler = CallbackQueryHandler;
        let query = TypedQuery {
            request_type: "callable",
            payload: Payload::Callback(Arc::new(|| Err("backend down".into()))),
        };

        let outcome = handler.handle(&query).expect("handled");
        assert_eq!(outcome.unwrap_err().to_string(), "backend down");
    }

    #[test]
    fn test_plain_value_payload_is_an_error() {
        let handler = CallbackQueryHandler;
        let query = TypedQuery {
            request_type: "callable",
            payload: Payload::Value(json!("not a callback")),
        };

        let outcome = handler.handle(&query).expect("handled");
        assert!(outcome.is_err());
    }
}
