//! Subscription Engine
//!
//! A Stream is an immutable recipe: a subscribe procedure that, given a
//! [`SafeSubscriber`], arranges for a producer (or another stream) to
//! deliver values into it and returns a [`Teardown`].
//!
//! # How Subscription Works
//!
//! 1. `subscribe` wraps the raw consumer in a [`SafeSubscriber`].
//!
//! 2. The stream's subscribe procedure runs with that wrapper as its only
//!    input and returns a teardown action.
//!
//! 3. The teardown is assigned into the wrapper's slot, and a
//!    [`Subscription`] handle — the only public cancellation entry point —
//!    is returned to the caller.
//!
//! A stream is stateless between subscriptions: each `subscribe` call is
//! independent and typically creates a fresh producer instance (unicast).
//!
//! # Synchronous Sources
//!
//! A subscribe procedure may deliver values — even terminate — before it
//! returns. Those deliveries go through the wrapper's usual checks; the
//! only thing unavailable during that window is cancellation, because the
//! teardown has not been assigned yet. If the wrapper terminated inside
//! the window, the teardown runs as soon as it is assigned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::consumer::Consumer;
use super::error::HandlerResult;
use super::subscriber::{SafeSubscriber, SubscriptionId};
use super::teardown::Teardown;

/// The shape of a subscribe procedure.
type SubscribeFn<T, E> = dyn Fn(SafeSubscriber<T, E>) -> Teardown + Send + Sync;

/// An immutable, reusable recipe binding consumers to a value source.
///
/// Cloning shares the recipe; each clone subscribes identically.
///
/// # Example
///
/// ```rust,ignore
/// let stream = Stream::new(|subscriber| {
///     for n in 0..3 {
///         let _ = subscriber.next(n);
///     }
///     let _ = subscriber.complete();
///     Teardown::noop()
/// });
///
/// let subscription = stream.subscribe(Consumer::from_next(|n| {
///     println!("{n}");
///     Ok(())
/// }));
/// ```
pub struct Stream<T, E> {
    /// The subscribe procedure.
    on_subscribe: Arc<SubscribeFn<T, E>>,
}

impl<T: 'static, E: 'static> Stream<T, E> {
    /// Create a stream from a subscribe procedure.
    ///
    /// The procedure receives the safety wrapper as its only input and
    /// must return a teardown action — [`Teardown::noop`] if there is
    /// nothing to release.
    pub fn new<F>(on_subscribe: F) -> Self
    where
        F: Fn(SafeSubscriber<T, E>) -> Teardown + Send + Sync + 'static,
    {
        Self {
            on_subscribe: Arc::new(on_subscribe),
        }
    }

    /// Subscribe a consumer to this stream.
    ///
    /// Wraps the consumer in a [`SafeSubscriber`], runs the subscribe
    /// procedure, assigns the returned teardown, and hands back the
    /// cancellation handle.
    pub fn subscribe(&self, consumer: Consumer<T, E>) -> Subscription {
        let subscriber = SafeSubscriber::new(consumer);
        tracing::trace!(subscription = subscriber.id().value(), "subscribing consumer");

        let teardown = (self.on_subscribe)(subscriber.clone());
        subscriber.set_teardown(teardown);

        Subscription::new(subscriber)
    }

    /// Subscribe with a bare `next` closure.
    ///
    /// Convenience for the common next-only case; error and completion
    /// signals are silently disabled.
    pub fn subscribe_next<F>(&self, next: F) -> Subscription
    where
        F: FnMut(T) -> HandlerResult + Send + 'static,
    {
        self.subscribe(Consumer::from_next(next))
    }

    /// Transform each emitted value with `project`.
    ///
    /// Returns a new stream whose subscribe procedure interposes a relay
    /// consumer: `next` forwards `project(value)` downstream, `error` and
    /// `complete` forward unchanged, and the teardown delegates one level
    /// up the chain. No buffering: one upstream emission causes exactly
    /// one downstream emission, in order.
    pub fn map<U, F>(&self, project: F) -> Stream<U, E>
    where
        U: 'static,
        E: Send + 'static,
        T: Send,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        let project = Arc::new(project);

        Stream::new(move |downstream: SafeSubscriber<U, E>| {
            let project = Arc::clone(&project);

            let relay = Consumer::new()
                .on_next({
                    let downstream = downstream.clone();
                    let project = Arc::clone(&project);
                    move |value: T| downstream.next(project(value))
                })
                .on_error({
                    let downstream = downstream.clone();
                    move |err: E| downstream.error(err)
                })
                .on_complete({
                    let downstream = downstream.clone();
                    move || downstream.complete()
                });

            let upstream = source.subscribe(relay);
            Teardown::new(move || upstream.unsubscribe())
        })
    }

    /// Apply a single operator to this stream.
    ///
    /// Chained `pipe` calls and the [`pipe!`](crate::pipe) macro are
    /// behaviorally identical to direct method chaining.
    pub fn pipe<U: 'static, Op>(self, op: Op) -> Stream<U, E>
    where
        Op: FnOnce(Stream<T, E>) -> Stream<U, E>,
    {
        op(self)
    }
}

impl<T, E> Clone for Stream<T, E> {
    fn clone(&self) -> Self {
        Self {
            on_subscribe: Arc::clone(&self.on_subscribe),
        }
    }
}

impl<T, E> std::fmt::Debug for Stream<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

/// Cancellation handle returned by [`Stream::subscribe`].
///
/// `unsubscribe` is idempotent by delegation to the safety wrapper: the
/// teardown runs at most once no matter how many times the handle is
/// invoked. Dropping the handle does *not* cancel the subscription.
pub struct Subscription {
    /// The subscription this handle cancels.
    id: SubscriptionId,

    /// Terminated flag shared with the safety wrapper.
    terminated: Arc<AtomicBool>,

    /// Bound cancellation action delegating to the wrapper.
    cancel: Arc<dyn Fn() + Send + Sync>,
}

impl Subscription {
    /// Build the handle for a safety wrapper.
    fn new<T: 'static, E: 'static>(subscriber: SafeSubscriber<T, E>) -> Self {
        let id = subscriber.id();
        let terminated = subscriber.terminated_flag();
        Self {
            id,
            terminated,
            cancel: Arc::new(move || subscriber.unsubscribe()),
        }
    }

    /// Get the subscription's unique ID.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Cancel the subscription.
    ///
    /// Safe to call any number of times; the underlying teardown runs at
    /// most once.
    pub fn unsubscribe(&self) {
        (self.cancel)();
    }

    /// Whether the subscription has terminated, for any reason.
    pub fn is_closed(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl Clone for Subscription {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            terminated: Arc::clone(&self.terminated),
            cancel: Arc::clone(&self.cancel),
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
