//! Delivery-path benchmarks.
//!
//! Measures the per-value cost of threading an emission through the
//! safety wrapper, with and without operator relays in between.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rill_core::stream::{SafeSubscriber, Stream, Teardown};

/// Synchronous source emitting `0..count`.
fn range(count: u64) -> Stream<u64, String> {
    Stream::new(move |subscriber: SafeSubscriber<u64, String>| {
        for n in 0..count {
            if subscriber.next(n).is_err() {
                break;
            }
        }
        let _ = subscriber.complete();
        Teardown::noop()
    })
}

fn bench_direct_delivery(c: &mut Criterion) {
    let stream = range(1_000);
    c.bench_function("deliver_1k_direct", |b| {
        b.iter(|| {
            stream.subscribe_next(|n| {
                black_box(n);
                Ok(())
            });
        });
    });
}

fn bench_mapped_delivery(c: &mut Criterion) {
    let stream = range(1_000).map(|n| n + n).map(|n| n + 1);
    c.bench_function("deliver_1k_two_relays", |b| {
        b.iter(|| {
            stream.subscribe_next(|n| {
                black_box(n);
                Ok(())
            });
        });
    });
}

criterion_group!(benches, bench_direct_delivery, bench_mapped_delivery);
criterion_main!(benches);
