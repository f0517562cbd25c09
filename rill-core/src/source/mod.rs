//! Value Producers
//!
//! External collaborators of the stream core: the schedulable timer
//! abstraction and the periodic [`Ticker`] producer built on it. The core
//! depends on nothing about a producer beyond its three callback slots
//! and its release operation.

pub mod ticker;
pub mod timer;

pub use ticker::{Ticker, TickerCallbacks, TickerConfig};
pub use timer::{ManualTimer, TickFn, Timer, TimerHandle, TokioTimer};
