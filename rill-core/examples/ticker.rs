//! Subscribe to the periodic ticker, transform its values, and cancel
//! after a few seconds.
//!
//! Run with: `cargo run --example ticker`

use std::sync::Arc;
use std::time::Duration;

use rill_core::source::{Ticker, TickerConfig, TokioTimer};
use rill_core::stream::Consumer;

#[tokio::main]
async fn main() {
    let stream = Ticker::stream(Arc::new(TokioTimer), TickerConfig::default())
        .map(|x| x + x)
        .map(|x| format!("{x}!"));

    let subscription = stream.subscribe(
        Consumer::new()
            .on_next(|v: String| {
                println!("{v}");
                Ok(())
            })
            .on_error(|err: String| {
                eprintln!("error: {err}");
                Ok(())
            })
            .on_complete(|| {
                println!("done");
                Ok(())
            }),
    );

    // The ticker completes on its own after the limit; the unsubscribe
    // afterwards demonstrates that late cancellation stays a no-op.
    tokio::time::sleep(Duration::from_millis(5500)).await;
    subscription.unsubscribe();
}
