//! Error types for cqrs-dispatch.

use thiserror::Error;

/// Boxed error type used for opaque handler-reported failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type surfaced by a dispatch call.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No registered handler (after filtering) reported the request as
    /// handled. Carries the request discriminator and the full handler list
    /// for diagnostics. Never retried automatically.
    #[error("no handler used for request type {request_type:?} (registered handlers: {handlers:?})")]
    NoHandlerUsed {
        /// `request_type` discriminator of the unhandled request.
        request_type: String,
        /// Names of every registered handler, in priority order.
        handlers: Vec<String>,
    },

    /// A supporting handler reported an error outcome. Resolution stops at
    /// the first handler that handles a request, success or failure, so this
    /// is final for the dispatch call - no fallback occurs.
    #[error("handler {handler} failed: {source}")]
    Handler {
        /// Name of the handler that reported the error.
        handler: String,
        /// The handler's error, passed through unchanged.
        #[source]
        source: BoxError,
    },
}

impl DispatchError {
    /// True when no handler handled the request at all.
    pub fn is_no_handler_used(&self) -> bool {
        matches!(self, DispatchError::NoHandlerUsed { .. })
    }
}

/// Result type alias using [`DispatchError`].
pub type Result<T> = std::result::Result<T, DispatchError>;
