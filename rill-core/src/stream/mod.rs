//! Push-Based Stream Primitives
//!
//! This module implements the core stream runtime: consumers, the safety
//! wrapper, the subscription engine, and operator composition.
//!
//! # Concepts
//!
//! ## Consumer
//!
//! A [`Consumer`] is a caller-supplied set of at most three optional
//! handlers — `next`, `error`, `complete`. Absent handlers silently
//! disable that signal path.
//!
//! ## Safe Subscriber
//!
//! A [`SafeSubscriber`] wraps exactly one consumer and enforces the
//! delivery invariants: nothing is delivered after termination, the
//! teardown action runs at most once, and a failing handler is torn down
//! before its failure propagates back to the emission site.
//!
//! ## Stream
//!
//! A [`Stream`] is an immutable subscribe recipe. Subscribing wraps the
//! consumer, runs the recipe, captures the returned [`Teardown`], and
//! hands back a [`Subscription`] — the one public cancellation handle.
//! Streams are unicast: every subscription drives an independent producer
//! instance.
//!
//! ## Operators
//!
//! An operator is a pure `Stream -> Stream` transform built from a relay
//! consumer; see [`operator`](self::operator). Direct chaining and the
//! [`pipe!`](crate::pipe) macro compose identically.

mod consumer;
mod engine;
mod error;
pub mod operator;
mod subscriber;
mod teardown;

pub use consumer::Consumer;
pub use engine::{Stream, Subscription};
pub use error::{HandlerError, HandlerResult};
pub use subscriber::{SafeSubscriber, SubscriptionId};
pub use teardown::Teardown;
