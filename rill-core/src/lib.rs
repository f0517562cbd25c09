//! Rill Core
//!
//! This crate provides the core runtime for the Rill push-based reactive
//! stream library. It implements:
//!
//! - Stream primitives (consumers, safe subscribers, subscriptions)
//! - The subscription engine with guaranteed teardown semantics
//! - Operator and pipeline composition (`map`, `pipe!`)
//! - A timer-driven sequence producer with injectable clocks
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `stream`: the delivery core — safety wrapper, subscription engine,
//!   and operator composition
//! - `source`: producer collaborators — the timer abstraction and the
//!   periodic ticker
//!
//! # Delivery Semantics
//!
//! Delivery is synchronous and single-threaded per chain: values thread
//! from the producer through any operator relays into the safety wrapper
//! on whatever execution context the producer ticks on. The wrapper
//! guarantees that no signal reaches a consumer after termination, that
//! teardown runs at most once, and that a failing handler is torn down
//! before its failure propagates back to the emission site.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rill_core::source::{Ticker, TickerConfig, TokioTimer};
//! use rill_core::stream::Consumer;
//!
//! let stream = Ticker::stream(Arc::new(TokioTimer), TickerConfig::default());
//!
//! let subscription = stream
//!     .map(|x| x + x)
//!     .map(|x| format!("{x}!"))
//!     .subscribe(
//!         Consumer::new()
//!             .on_next(|v| { println!("{v}"); Ok(()) })
//!             .on_complete(|| { println!("done"); Ok(()) }),
//!     );
//!
//! // Later: subscription.unsubscribe();
//! ```

pub mod source;
pub mod stream;

pub use source::{ManualTimer, Ticker, TickerCallbacks, TickerConfig, Timer, TimerHandle, TokioTimer};
pub use stream::{
    Consumer, HandlerError, HandlerResult, SafeSubscriber, Stream, Subscription, SubscriptionId,
    Teardown,
};
