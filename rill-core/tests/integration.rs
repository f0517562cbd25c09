//! Integration Tests for the Stream Runtime
//!
//! These tests drive the full chain — ticker producer, operator relays,
//! safety wrapper, subscription handle — with a deterministic timer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rill_core::source::{ManualTimer, Ticker, TickerConfig};
use rill_core::stream::{operator::map, Consumer, HandlerError};
use rill_core::pipe;

fn test_config() -> TickerConfig {
    TickerConfig {
        period: Duration::from_millis(200),
        limit: 10,
    }
}

/// The full happy path: values 0..=10 collected in order, completion flag
/// set, producer released exactly once without explicit cancellation.
#[test]
fn ticker_stream_delivers_sequence_then_completes() {
    let timer = ManualTimer::new();
    let stream = Ticker::stream(Arc::new(timer.clone()), test_config());

    let values = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(AtomicBool::new(false));

    let values_clone = values.clone();
    let completed_clone = completed.clone();
    let subscription = stream.subscribe(
        Consumer::new()
            .on_next(move |n: u64| {
                values_clone.lock().unwrap().push(n);
                Ok(())
            })
            .on_complete(move || {
                completed_clone.store(true, Ordering::SeqCst);
                Ok(())
            }),
    );

    // Drive well past the limit; emission must stop at 10.
    timer.fire_n(20).unwrap();

    let collected: Vec<u64> = values.lock().unwrap().clone();
    assert_eq!(collected, (0..=10).collect::<Vec<u64>>());
    assert!(completed.load(Ordering::SeqCst));
    assert!(subscription.is_closed());
    // The completion tore the chain down and cancelled the schedule.
    assert_eq!(timer.active_count(), 0);
}

/// Cancelling immediately after subscribing, before any emission: zero
/// deliveries and the producer released exactly once.
#[test]
fn immediate_cancel_before_any_emission() {
    let timer = ManualTimer::new();
    let stream = Ticker::stream(Arc::new(timer.clone()), test_config());

    let delivered = Arc::new(AtomicUsize::new(0));
    let delivered_clone = delivered.clone();

    let subscription = stream.subscribe_next(move |_| {
        delivered_clone.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    assert_eq!(timer.active_count(), 1);
    subscription.unsubscribe();
    assert_eq!(timer.active_count(), 0);

    // Ticks after cancellation deliver nothing.
    timer.fire_n(5).unwrap();
    assert_eq!(delivered.load(Ordering::SeqCst), 0);

    // Repeated cancellation stays a no-op.
    subscription.unsubscribe();
    assert_eq!(timer.active_count(), 0);
}

/// A failing `next` handler: the producer is released before the failure
/// reaches the emission site (the timer tick).
#[test]
fn handler_failure_releases_producer_before_surfacing() {
    let timer = ManualTimer::new();
    let stream = Ticker::stream(Arc::new(timer.clone()), test_config());

    stream.subscribe_next(|_| Err(HandlerError::new("first value rejected")));

    let result = timer.fire();

    // The failure surfaced at the emission site, and by that time the
    // schedule had already been cancelled.
    assert!(result.is_err());
    assert_eq!(timer.active_count(), 0);
}

/// map(f) then map(g) over the full ticker sequence: downstream sees
/// g(f(n)) in order, then exactly one complete.
#[test]
fn mapped_chain_transforms_in_order() {
    let timer = ManualTimer::new();
    let stream = Ticker::stream(Arc::new(timer.clone()), test_config())
        .map(|x| x + x)
        .map(|x| format!("{x}!"));

    let values = Arc::new(Mutex::new(Vec::new()));
    let completions = Arc::new(AtomicUsize::new(0));

    let values_clone = values.clone();
    let completions_clone = completions.clone();
    stream.subscribe(
        Consumer::new()
            .on_next(move |v: String| {
                values_clone.lock().unwrap().push(v);
                Ok(())
            })
            .on_complete(move || {
                completions_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
    );

    timer.fire_n(15).unwrap();

    let expected: Vec<String> = (0..=10u64).map(|n| format!("{}!", n + n)).collect();
    assert_eq!(*values.lock().unwrap(), expected);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(timer.active_count(), 0);
}

/// Pipeline composition and direct chaining produce identical delivery
/// sequences.
#[test]
fn pipe_and_chaining_are_equivalent() {
    fn run(stream: rill_core::Stream<String, String>, timer: &ManualTimer) -> (Vec<String>, usize) {
        let values = Arc::new(Mutex::new(Vec::new()));
        let completions = Arc::new(AtomicUsize::new(0));

        let values_clone = values.clone();
        let completions_clone = completions.clone();
        stream.subscribe(
            Consumer::new()
                .on_next(move |v: String| {
                    values_clone.lock().unwrap().push(v);
                    Ok(())
                })
                .on_complete(move || {
                    completions_clone.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
        );

        timer.fire_n(15).unwrap();

        let collected = values.lock().unwrap().clone();
        (collected, completions.load(Ordering::SeqCst))
    }

    let chain_timer = ManualTimer::new();
    let chained = Ticker::stream(Arc::new(chain_timer.clone()), test_config())
        .map(|x| x + x)
        .map(|x| format!("{x}!"));

    let pipe_timer = ManualTimer::new();
    let piped = pipe!(
        Ticker::stream(Arc::new(pipe_timer.clone()), test_config()),
        map(|x| x + x),
        map(|x: u64| format!("{x}!")),
    );

    let (chained_values, chained_completions) = run(chained, &chain_timer);
    let (piped_values, piped_completions) = run(piped, &pipe_timer);

    assert_eq!(chained_values, piped_values);
    assert_eq!(chained_completions, piped_completions);
    assert_eq!(chained_completions, 1);
}

/// Unsubscribing from inside a handler mid-chain: the in-flight delivery
/// is absorbed and the producer releases exactly once.
#[test]
fn unsubscribe_from_inside_handler() {
    let timer = ManualTimer::new();
    let stream = Ticker::stream(Arc::new(timer.clone()), test_config());

    let delivered = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<rill_core::Subscription>>> = Arc::new(Mutex::new(None));

    let delivered_clone = delivered.clone();
    let slot_clone = slot.clone();
    let subscription = stream.subscribe_next(move |n| {
        delivered_clone.fetch_add(1, Ordering::SeqCst);
        if n == 2 {
            if let Some(subscription) = slot_clone.lock().unwrap().as_ref() {
                subscription.unsubscribe();
            }
        }
        Ok(())
    });
    *slot.lock().unwrap() = Some(subscription.clone());

    timer.fire_n(10).unwrap();

    // Values 0, 1, 2 delivered; the cancel from inside the handler for
    // n == 2 stopped everything after it.
    assert_eq!(delivered.load(Ordering::SeqCst), 3);
    assert!(subscription.is_closed());
    assert_eq!(timer.active_count(), 0);
}

/// Two subscriptions to one stream drive independent producer instances.
#[test]
fn subscriptions_are_unicast() {
    let timer = ManualTimer::new();
    let stream = Ticker::stream(Arc::new(timer.clone()), test_config());

    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let first_clone = first.clone();
    stream.subscribe_next(move |_| {
        first_clone.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    timer.fire().unwrap();

    let second_clone = second.clone();
    stream.subscribe_next(move |_| {
        second_clone.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    assert_eq!(timer.active_count(), 2);
    timer.fire().unwrap();

    // The first subscriber is two values in; the second starts from zero
    // on its own producer.
    assert_eq!(first.load(Ordering::SeqCst), 2);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

/// The tokio-backed timer drives the same chain end to end.
#[tokio::test(start_paused = true)]
async fn ticker_stream_on_tokio_timer() {
    use rill_core::source::TokioTimer;

    let stream = Ticker::stream(
        Arc::new(TokioTimer),
        TickerConfig {
            period: Duration::from_millis(200),
            limit: 3,
        },
    );

    let values = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(AtomicBool::new(false));

    let values_clone = values.clone();
    let completed_clone = completed.clone();
    stream.subscribe(
        Consumer::new()
            .on_next(move |n: u64| {
                values_clone.lock().unwrap().push(n);
                Ok(())
            })
            .on_complete(move || {
                completed_clone.store(true, Ordering::SeqCst);
                Ok(())
            }),
    );

    // Four periods emit 0..=3; allow a little slack for the final tick.
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(*values.lock().unwrap(), vec![0, 1, 2, 3]);
    assert!(completed.load(Ordering::SeqCst));
}
