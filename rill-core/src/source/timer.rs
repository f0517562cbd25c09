//! Schedulable Timers
//!
//! Producers never reach for a global clock: they are handed a [`Timer`]
//! and schedule their ticks through it, receiving a [`TimerHandle`] with
//! which the schedule can be cancelled. That keeps the production path on
//! tokio while tests drive a [`ManualTimer`] deterministically.
//!
//! # Failure Propagation
//!
//! A tick callback returns a [`HandlerResult`]. `Err` means a consumer
//! handler failed somewhere down the delivery chain; by contract the
//! chain has already been torn down, so the schedule stops. With a
//! [`ManualTimer`], the failure is returned from [`ManualTimer::fire`] —
//! the emission site — so callers observe it exactly where the original
//! push happened.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::stream::HandlerResult;

/// A scheduled tick callback.
pub type TickFn = Box<dyn FnMut() -> HandlerResult + Send>;

/// A source of periodic ticks.
///
/// Implementations own the mechanics (a tokio task, a test harness); the
/// producer only sees `schedule` and the returned cancel handle.
pub trait Timer: Send + Sync {
    /// Schedule `tick` to run every `period` until cancelled or until a
    /// tick returns `Err`.
    fn schedule(&self, period: Duration, tick: TickFn) -> TimerHandle;
}

/// Cancel handle for a scheduled tick.
///
/// Cancellation is idempotent: the underlying cancel action runs at most
/// once.
pub struct TimerHandle {
    /// Whether the schedule has been cancelled.
    cancelled: Arc<AtomicBool>,

    /// The one-shot cancel action.
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl TimerHandle {
    /// Create a handle wrapping a cancel action.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Cancel the schedule. Safe to call multiple times.
    pub fn cancel(&self) {
        let action = self.cancel.lock().take();
        if let Some(action) = action {
            self.cancelled.store(true, Ordering::SeqCst);
            action();
        }
    }

    /// Whether `cancel` has run.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tokio timer
// ----------------------------------------------------------------------------

/// Production timer backed by a tokio interval task.
///
/// Each schedule spawns one task; cancelling the handle aborts it. Must be
/// used from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn schedule(&self, period: Duration, mut tick: TickFn) -> TimerHandle {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first interval tick completes immediately; skip it so
            // the first emission lands one full period after scheduling.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(err) = tick() {
                    tracing::error!(%err, "tick delivery failed; stopping timer");
                    break;
                }
            }
        });

        TimerHandle::new(move || task.abort())
    }
}

// ----------------------------------------------------------------------------
// Manual timer
// ----------------------------------------------------------------------------

/// One scheduled tick registered with a [`ManualTimer`].
struct ManualTask {
    /// The tick callback, run on every `fire`.
    tick: Mutex<TickFn>,

    /// Set when the schedule's handle is cancelled.
    cancelled: Arc<AtomicBool>,
}

/// Deterministic timer for tests.
///
/// Nothing runs until [`fire`](ManualTimer::fire) is called; each call
/// runs every still-active tick callback exactly once, in scheduling
/// order. Cloning shares the schedule list.
#[derive(Clone, Default)]
pub struct ManualTimer {
    tasks: Arc<Mutex<Vec<Arc<ManualTask>>>>,
}

impl ManualTimer {
    /// Create an empty manual timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every active tick callback once.
    ///
    /// Returns the first handler failure encountered, after all active
    /// callbacks have been offered their tick. A cancelled schedule is
    /// skipped, including one cancelled by an earlier callback in the
    /// same call, and a tick that returns `Err` cancels its own schedule.
    pub fn fire(&self) -> HandlerResult {
        // Snapshot under a short lock so a tick may schedule or cancel
        // without deadlocking.
        let snapshot: Vec<Arc<ManualTask>> = self.tasks.lock().clone();

        let mut first_failure = Ok(());
        for task in snapshot {
            if task.cancelled.load(Ordering::SeqCst) {
                continue;
            }
            let result = {
                let mut tick = task.tick.lock();
                (*tick)()
            };
            if result.is_err() {
                // A failed tick stops its schedule, same as the tokio
                // task breaking its loop.
                task.cancelled.store(true, Ordering::SeqCst);
                if first_failure.is_ok() {
                    first_failure = result;
                }
            }
        }
        first_failure
    }

    /// Run every active callback `n` times.
    pub fn fire_n(&self, n: usize) -> HandlerResult {
        for _ in 0..n {
            self.fire()?;
        }
        Ok(())
    }

    /// Number of schedules that have not been cancelled.
    pub fn active_count(&self) -> usize {
        self.tasks
            .lock()
            .iter()
            .filter(|task| !task.cancelled.load(Ordering::SeqCst))
            .count()
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, _period: Duration, tick: TickFn) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let task = Arc::new(ManualTask {
            tick: Mutex::new(tick),
            cancelled: Arc::clone(&cancelled),
        });
        self.tasks.lock().push(task);

        TimerHandle::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}

impl std::fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTimer")
            .field("active", &self.active_count())
            .finish()
    }
}
