//! Handler failure types.
//!
//! A handler failure is a failure raised by a user-supplied handler while a
//! signal was being delivered to it. The runtime never converts a handler
//! failure into an `error` signal and never swallows it: it guarantees that
//! teardown has run, then hands the failure back to whoever pushed the
//! signal (the emission site).
//!
//! Handler invocation is modeled as an explicit result rather than stack
//! unwinding, so the teardown-before-propagation guarantee does not depend
//! on any particular unwinding mechanism.

use std::error::Error;
use std::sync::Arc;

use thiserror::Error;

/// Result of invoking a consumer handler.
///
/// `Err` means the handler failed. By the time an `Err` is observed by the
/// emission site, the subscription's teardown has already run.
pub type HandlerResult = Result<(), HandlerError>;

/// A failure raised by a user-supplied handler during signal delivery.
///
/// Carries a human-readable message and, optionally, the underlying error
/// that caused the handler to fail.
#[derive(Debug, Clone, Error)]
#[error("handler failed: {message}")]
pub struct HandlerError {
    /// Description of the failure.
    message: String,

    /// The underlying cause, if the handler surfaced one.
    #[source]
    source: Option<Arc<dyn Error + Send + Sync>>,
}

impl HandlerError {
    /// Create a handler error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a handler error that wraps an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
