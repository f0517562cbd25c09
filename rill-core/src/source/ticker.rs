//! Ticker Producer
//!
//! The Ticker is the concrete value producer behind the built-in stream
//! source: a periodic sequence generator that emits `0, 1, 2, …` on every
//! timer tick, completes after emitting `limit`, and releases its timer
//! registration through an idempotent [`release`](Ticker::release).
//!
//! # Design
//!
//! - Callbacks are a fixed triple of optional callables injected at
//!   construction ([`TickerCallbacks`]); there are no mutable callback
//!   slots to assign after the fact.
//!
//! - The timer is an injected [`Timer`] dependency, so tests drive a
//!   ticker with a deterministic clock.
//!
//! - Each stream subscription builds its own ticker instance (unicast):
//!   see [`Ticker::stream`].
//!
//! The runtime depends on exactly four members of this producer: the
//! three callbacks and `release`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::timer::{Timer, TimerHandle};
use crate::stream::{HandlerResult, SafeSubscriber, Stream, Teardown};

/// Emission settings for a [`Ticker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerConfig {
    /// Time between emissions.
    pub period: Duration,

    /// Last value emitted; the ticker completes right after emitting it.
    pub limit: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(200),
            limit: 10,
        }
    }
}

/// The fixed triple of optional producer callbacks.
///
/// Absent callbacks disable that signal path, same as on a
/// [`Consumer`](crate::stream::Consumer).
#[derive(Default)]
pub struct TickerCallbacks {
    /// Invoked with each emitted value.
    pub on_data: Option<Box<dyn FnMut(u64) -> HandlerResult + Send>>,

    /// Invoked if the producer fails. This ticker never does; the slot
    /// exists so relays can wire the channel through uniformly.
    pub on_error: Option<Box<dyn FnMut(String) -> HandlerResult + Send>>,

    /// Invoked once, after the final value.
    pub on_complete: Option<Box<dyn FnMut() -> HandlerResult + Send>>,
}

impl std::fmt::Debug for TickerCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerCallbacks")
            .field("has_data", &self.on_data.is_some())
            .field("has_error", &self.on_error.is_some())
            .field("has_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// A periodic sequence producer.
///
/// Emits `0..=limit` through its callbacks, one value per timer tick,
/// then completes, cancelling its own timer registration. `release`
/// does the same ahead of time; either way the registration is freed
/// exactly once.
pub struct Ticker {
    /// Set once emission has stopped, by completion or release.
    released: Arc<AtomicBool>,

    /// Cancel handle for the scheduled tick. Shared with the tick
    /// closure so completion frees the schedule; emptied once cancelled.
    handle: Arc<Mutex<Option<TimerHandle>>>,
}

impl Ticker {
    /// Start a ticker on the given timer.
    pub fn start(timer: &dyn Timer, config: TickerConfig, callbacks: TickerCallbacks) -> Self {
        let released = Arc::new(AtomicBool::new(false));
        let handle: Arc<Mutex<Option<TimerHandle>>> = Arc::new(Mutex::new(None));
        let limit = config.limit;

        let mut callbacks = callbacks;
        let mut seq: u64 = 0;
        let released_clone = released.clone();
        let handle_clone = handle.clone();

        let scheduled = timer.schedule(
            config.period,
            Box::new(move || {
                if released_clone.load(Ordering::SeqCst) {
                    return Ok(());
                }

                let n = seq;
                seq += 1;

                if let Some(on_data) = callbacks.on_data.as_mut() {
                    on_data(n)?;
                }

                if n == limit {
                    // Stop emitting and free the schedule before the
                    // completion callback runs, so a reentrant release
                    // finds nothing left to do.
                    released_clone.store(true, Ordering::SeqCst);
                    if let Some(scheduled) = handle_clone.lock().take() {
                        scheduled.cancel();
                    }
                    if let Some(on_complete) = callbacks.on_complete.as_mut() {
                        on_complete()?;
                    }
                }

                Ok(())
            }),
        );
        *handle.lock() = Some(scheduled);

        tracing::debug!(limit, period_ms = config.period.as_millis() as u64, "ticker started");

        Self { released, handle }
    }

    /// Stop future emissions and free the underlying timer registration.
    ///
    /// Idempotent: the timer is cancelled at most once, whether by
    /// release or by running to completion.
    pub fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            tracing::debug!("ticker released");
        }
        if let Some(scheduled) = self.handle.lock().take() {
            scheduled.cancel();
        }
    }

    /// Whether the ticker has stopped emitting.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Build a stream backed by this producer type.
    ///
    /// Every subscription starts an independent ticker on `timer`
    /// (unicast); the subscription's teardown releases it.
    pub fn stream(timer: Arc<dyn Timer>, config: TickerConfig) -> Stream<u64, String> {
        Stream::new(move |subscriber: SafeSubscriber<u64, String>| {
            let callbacks = TickerCallbacks {
                on_data: Some(Box::new({
                    let subscriber = subscriber.clone();
                    move |n| subscriber.next(n)
                })),
                on_error: Some(Box::new({
                    let subscriber = subscriber.clone();
                    move |err| subscriber.error(err)
                })),
                on_complete: Some(Box::new({
                    let subscriber = subscriber.clone();
                    move || subscriber.complete()
                })),
            };

            let ticker = Ticker::start(timer.as_ref(), config.clone(), callbacks);
            Teardown::new(move || ticker.release())
        })
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("released", &self.is_released())
            .finish()
    }
}
