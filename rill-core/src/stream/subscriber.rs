//! Safe Subscriber Implementation
//!
//! The SafeSubscriber is the enforcement layer between a signal source and
//! a raw [`Consumer`]. Every subscription gets exactly one, and every
//! signal threads through it.
//!
//! # Guarantees
//!
//! 1. Once terminated, no handler of the wrapped consumer is ever invoked
//!    again. `Terminated` is absorbing.
//!
//! 2. The teardown action runs at most once, regardless of how many times
//!    or from where termination is requested.
//!
//! 3. If a handler fails, teardown runs *before* the failure is returned
//!    to the emission site. Failures are never swallowed and never turned
//!    into `error` signals.
//!
//! # Termination
//!
//! The subscriber terminates on explicit `unsubscribe()`, on successful
//! `error` or `complete` delivery, or on any handler failure. An `error`
//! or `complete` signal with no registered handler is discarded without
//! terminating — only the taken branch with a registered handler is
//! terminal.
//!
//! # Reentrancy
//!
//! Execution is single-threaded and cooperative, but handlers may signal
//! their own subscription mid-delivery: calling `unsubscribe()`, or even
//! delivering `error`/`complete` from inside a `next` handler. Handlers
//! are taken out of the consumer slot under the lock and run with the
//! lock released, so a nested delivery never deadlocks — it finds the
//! slot empty (or the flag set) and is absorbed. The teardown is removed
//! from its slot before executing, so a nested unsubscribe can neither
//! double-run the teardown nor let an in-flight delivery slip past the
//! termination check.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::consumer::Consumer;
use super::error::HandlerResult;
use super::teardown::Teardown;

/// Unique identifier for a subscription.
///
/// Each subscription gets a unique ID when its safety wrapper is created.
/// The ID shows up in trace output and lets callers correlate handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Generate a new unique subscription ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value, for logging.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Safety wrapper around a [`Consumer`].
///
/// Enforces the termination and teardown guarantees described in the
/// module docs. Cloning shares state: all clones refer to the same
/// subscription.
pub struct SafeSubscriber<T, E> {
    /// Unique identifier for this subscription.
    id: SubscriptionId,

    /// The wrapped consumer. Locked only to take a handler out or put it
    /// back; handlers run with the lock released.
    consumer: Arc<Mutex<Consumer<T, E>>>,

    /// Whether the subscription has terminated.
    terminated: Arc<AtomicBool>,

    /// The teardown slot. Assigned once by the subscription engine;
    /// emptied before the teardown runs.
    teardown: Arc<Mutex<Option<Teardown>>>,
}

impl<T, E> SafeSubscriber<T, E> {
    /// Wrap a raw consumer.
    pub(crate) fn new(consumer: Consumer<T, E>) -> Self {
        Self {
            id: SubscriptionId::new(),
            consumer: Arc::new(Mutex::new(consumer)),
            terminated: Arc::new(AtomicBool::new(false)),
            teardown: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the subscription's unique ID.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Whether the subscription has terminated.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Shared handle to the terminated flag, for the public subscription
    /// handle.
    pub(crate) fn terminated_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminated)
    }

    /// Deliver a value to the consumer's `next` handler.
    ///
    /// No-op if terminated or if no `next` handler is registered. A
    /// successful delivery never terminates the subscription. If the
    /// handler fails, the subscription is torn down and the failure is
    /// returned to the caller.
    pub fn next(&self, value: T) -> HandlerResult {
        // Take the handler under the lock, run it with the lock released
        // so it may signal this same subscription without deadlocking. A
        // reentrant `next` finds the slot empty and is absorbed.
        let mut handler = {
            let mut consumer = self.consumer.lock();
            if self.is_terminated() {
                return Ok(());
            }
            match consumer.next.take() {
                Some(handler) => handler,
                None => return Ok(()),
            }
        };

        let result = handler(value);

        {
            let mut consumer = self.consumer.lock();
            if consumer.next.is_none() {
                consumer.next = Some(handler);
            }
        }

        if result.is_err() {
            self.unsubscribe();
        }
        result
    }

    /// Deliver the terminal `error` signal.
    ///
    /// If an `error` handler is registered, it is invoked and the
    /// subscription terminates — after handler success and handler failure
    /// alike. A handler failure is returned to the caller after teardown.
    ///
    /// If no handler is registered the error value is discarded and the
    /// subscription does **not** terminate. This mirrors the evaluated
    /// behavior and is a known risk, so it is logged at warn level.
    pub fn error(&self, err: E) -> HandlerResult {
        // Terminal: the handler is taken for good and run outside the
        // lock, then the subscription is torn down.
        let mut handler = {
            let mut consumer = self.consumer.lock();
            if self.is_terminated() {
                return Ok(());
            }
            match consumer.error.take() {
                Some(handler) => handler,
                None => {
                    tracing::warn!(
                        subscription = self.id.0,
                        "error signal dropped: no error handler registered"
                    );
                    return Ok(());
                }
            }
        };

        let result = handler(err);
        self.unsubscribe();
        result
    }

    /// Deliver the terminal `complete` signal.
    ///
    /// Symmetric to [`error`](Self::error): invoked if registered,
    /// terminal after success or failure, discarded silently if absent.
    pub fn complete(&self) -> HandlerResult {
        let mut handler = {
            let mut consumer = self.consumer.lock();
            if self.is_terminated() {
                return Ok(());
            }
            match consumer.complete.take() {
                Some(handler) => handler,
                None => return Ok(()),
            }
        };

        let result = handler();
        self.unsubscribe();
        result
    }

    /// Terminate the subscription and run the teardown, if assigned and
    /// not yet run.
    ///
    /// Idempotent, and safe to call from inside a handler that is itself
    /// executing as part of a delivery on this subscription.
    pub fn unsubscribe(&self) {
        self.terminated.store(true, Ordering::SeqCst);

        // Take the teardown out of the slot before running it, so a
        // reentrant unsubscribe finds the slot empty.
        let teardown = self.teardown.lock().take();
        if let Some(teardown) = teardown {
            tracing::trace!(subscription = self.id.0, "running teardown");
            teardown.run();
        }
    }

    /// Assign the teardown action.
    ///
    /// Called once by the subscription engine after the subscribe
    /// procedure returns. If the subscription already terminated during
    /// the synchronous subscribe window, the teardown runs immediately —
    /// exactly once either way.
    pub(crate) fn set_teardown(&self, teardown: Teardown) {
        {
            let mut slot = self.teardown.lock();
            debug_assert!(slot.is_none(), "teardown assigned twice");
            *slot = Some(teardown);
        }

        if self.is_terminated() {
            if let Some(teardown) = self.teardown.lock().take() {
                tracing::trace!(
                    subscription = self.id.0,
                    "terminated during subscribe; running teardown"
                );
                teardown.run();
            }
        }
    }

    /// Replace the wrapped consumer's `next` handler.
    ///
    /// Exists for tests that need the handler to hold a clone of its own
    /// safety wrapper.
    #[cfg(test)]
    pub(crate) fn replace_next_handler(
        &self,
        handler: Box<dyn FnMut(T) -> HandlerResult + Send>,
    ) {
        self.consumer.lock().next = Some(handler);
    }
}

impl<T, E> Clone for SafeSubscriber<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            consumer: Arc::clone(&self.consumer),
            terminated: Arc::clone(&self.terminated),
            teardown: Arc::clone(&self.teardown),
        }
    }
}

impl<T, E> std::fmt::Debug for SafeSubscriber<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeSubscriber")
            .field("id", &self.id)
            .field("terminated", &self.is_terminated())
            .finish()
    }
}
