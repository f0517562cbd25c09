//! Consumer Implementation
//!
//! A Consumer is the caller-supplied set of handlers that receives signals
//! from a stream. It holds at most three optional handlers:
//!
//! - `on_next(value)` — receives each emitted value
//! - `on_error(err)` — receives the terminal error signal
//! - `on_complete()` — receives the terminal completion signal
//!
//! Any subset may be absent. Absence means "do not deliver this signal
//! type" — it is never an error to leave a handler out.
//!
//! # Handler Contract
//!
//! Every handler returns a [`HandlerResult`]. Returning `Err` tells the
//! runtime the handler failed; the runtime then tears the subscription down
//! and forwards the failure to the emission site. See the `subscriber`
//! module for the exact guarantees.
//!
//! # Example
//!
//! ```rust,ignore
//! let consumer = Consumer::new()
//!     .on_next(|v: i32| {
//!         println!("got {v}");
//!         Ok(())
//!     })
//!     .on_complete(|| {
//!         println!("done");
//!         Ok(())
//!     });
//! ```

use super::error::HandlerResult;

/// Boxed `next` handler.
pub(crate) type NextHandler<T> = Box<dyn FnMut(T) -> HandlerResult + Send>;

/// Boxed `error` handler.
pub(crate) type ErrorHandler<E> = Box<dyn FnMut(E) -> HandlerResult + Send>;

/// Boxed `complete` handler.
pub(crate) type CompleteHandler = Box<dyn FnMut() -> HandlerResult + Send>;

/// A set of at most three optional signal handlers.
///
/// Built with the chainable `on_next` / `on_error` / `on_complete` methods.
/// Handlers that are not registered silently disable that signal path.
pub struct Consumer<T, E> {
    /// Handler for emitted values, if registered.
    pub(crate) next: Option<NextHandler<T>>,

    /// Handler for the terminal error signal, if registered.
    pub(crate) error: Option<ErrorHandler<E>>,

    /// Handler for the terminal completion signal, if registered.
    pub(crate) complete: Option<CompleteHandler>,
}

impl<T, E> Consumer<T, E> {
    /// Create a consumer with no handlers registered.
    pub fn new() -> Self {
        Self {
            next: None,
            error: None,
            complete: None,
        }
    }

    /// Create a consumer with only a `next` handler.
    ///
    /// Shorthand for the common case where error and completion signals
    /// are not of interest.
    pub fn from_next<F>(next: F) -> Self
    where
        F: FnMut(T) -> HandlerResult + Send + 'static,
    {
        Self::new().on_next(next)
    }

    /// Register the `next` handler.
    pub fn on_next<F>(mut self, next: F) -> Self
    where
        F: FnMut(T) -> HandlerResult + Send + 'static,
    {
        self.next = Some(Box::new(next));
        self
    }

    /// Register the `error` handler.
    pub fn on_error<F>(mut self, error: F) -> Self
    where
        F: FnMut(E) -> HandlerResult + Send + 'static,
    {
        self.error = Some(Box::new(error));
        self
    }

    /// Register the `complete` handler.
    pub fn on_complete<F>(mut self, complete: F) -> Self
    where
        F: FnMut() -> HandlerResult + Send + 'static,
    {
        self.complete = Some(Box::new(complete));
        self
    }

    /// Whether a `next` handler is registered.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Whether an `error` handler is registered.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether a `complete` handler is registered.
    pub fn has_complete(&self) -> bool {
        self.complete.is_some()
    }
}

impl<T, E> Default for Consumer<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> std::fmt::Debug for Consumer<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("has_next", &self.has_next())
            .field("has_error", &self.has_error())
            .field("has_complete", &self.has_complete())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    #[test]
    fn empty_consumer_has_no_handlers() {
        let consumer: Consumer<i32, String> = Consumer::new();

        assert!(!consumer.has_next());
        assert!(!consumer.has_error());
        assert!(!consumer.has_complete());
    }

    #[test]
    fn builder_registers_handlers() {
        let consumer: Consumer<i32, String> = Consumer::new()
            .on_next(|_| Ok(()))
            .on_error(|_| Ok(()))
            .on_complete(|| Ok(()));

        assert!(consumer.has_next());
        assert!(consumer.has_error());
        assert!(consumer.has_complete());
    }

    #[test]
    fn from_next_registers_only_next() {
        let consumer: Consumer<i32, String> = Consumer::from_next(|_| Ok(()));

        assert!(consumer.has_next());
        assert!(!consumer.has_error());
        assert!(!consumer.has_complete());
    }

    #[test]
    fn next_handler_receives_values() {
        let total = Arc::new(AtomicI32::new(0));
        let total_clone = total.clone();

        let mut consumer: Consumer<i32, String> = Consumer::from_next(move |v| {
            total_clone.fetch_add(v, Ordering::SeqCst);
            Ok(())
        });

        let handler = consumer.next.as_mut().unwrap();
        handler(3).unwrap();
        handler(4).unwrap();

        assert_eq!(total.load(Ordering::SeqCst), 7);
    }
}
