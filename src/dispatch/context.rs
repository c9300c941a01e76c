//! Per-call dispatch state.

use std::time::Instant;

use serde_json::Value;
use uuid::Uuid;

use crate::error::BoxError;
use crate::request::Initiator;
use crate::tag::value_tag;

/// The handler that claimed the current dispatch.
#[derive(Debug, Clone)]
pub(crate) struct UsedHandler {
    pub name: &'static str,
    pub is_cache_read: bool,
}

/// All mutable state of one dispatch call.
///
/// Allocated per call, never shared, so nested dispatches (a decoder
/// reentering the dispatcher) cannot corrupt each other. The `key` is the
/// correlation id under which the profiler item for this call is stored.
pub(crate) struct DispatchContext<'a> {
    key: Uuid,
    initiator: Initiator<'a>,
    used_handler: Option<UsedHandler>,
    handled_response_type: Option<&'static str>,
    response: Option<Value>,
    error: Option<BoxError>,
    used_decoders: Vec<String>,
    is_already_cached: bool,
    started_at: Option<Instant>,
}

impl<'a> DispatchContext<'a> {
    pub fn new(initiator: Initiator<'a>) -> Self {
        Self {
            key: Uuid::new_v4(),
            initiator,
            used_handler: None,
            handled_response_type: None,
            response: None,
            error: None,
            used_decoders: Vec::new(),
            is_already_cached: false,
            started_at: None,
        }
    }

    pub fn key(&self) -> &Uuid {
        &self.key
    }

    pub fn initiator(&self) -> Initiator<'a> {
        self.initiator
    }

    pub fn is_handled(&self) -> bool {
        self.used_handler.is_some()
    }

    pub fn used_handler(&self) -> Option<&UsedHandler> {
        self.used_handler.as_ref()
    }

    /// Type tag of the raw handled response, or `"error"`.
    pub fn handled_response_type(&self) -> &'static str {
        self.handled_response_type.unwrap_or("unknown")
    }

    pub fn record_success(&mut self, handler_name: &'static str, is_cache_read: bool, response: Value) {
        self.handled_response_type = Some(value_tag(&response));
        self.used_handler = Some(UsedHandler {
            name: handler_name,
            is_cache_read,
        });
        self.response = Some(response);
    }

    pub fn record_error(&mut self, handler_name: &'static str, is_cache_read: bool, error: BoxError) {
        self.handled_response_type = Some("error");
        self.used_handler = Some(UsedHandler {
            name: handler_name,
            is_cache_read,
        });
        self.error = Some(error);
    }

    pub fn response(&self) -> Option<&Value> {
        self.response.as_ref()
    }

    pub fn take_response(&mut self) -> Option<Value> {
        self.response.take()
    }

    pub fn set_response(&mut self, response: Value) {
        self.response = Some(response);
    }

    pub fn error(&self) -> Option<&BoxError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<BoxError> {
        self.error.take()
    }

    pub fn add_used_decoder(&mut self, descriptor: String) {
        self.used_decoders.push(descriptor);
    }

    pub fn used_decoders(&self) -> &[String] {
        &self.used_decoders
    }

    /// True once this call's response has been written to the cache (or an
    /// impure decoder forced the pre-decode write).
    pub fn is_already_cached(&self) -> bool {
        self.is_already_cached
    }

    pub fn set_already_cached(&mut self) {
        self.is_already_cached = true;
    }

    pub fn start_stopwatch(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn elapsed_ms(&self) -> Option<u64> {
        self.started_at
            .map(|started_at| started_at.elapsed().as_millis() as u64)
    }
}
