//! Basic fixed-window rate limiting example.
//!
//! Run with:
//! ```
//! cargo run --example basic --features memory
//! ```

use ratewindow::{Limiter, MemoryStore, Policy};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // One in-process store; every limiter bound from it shares state.
    let store = MemoryStore::new();

    // 5 calls per 2-second window
    let limiter = Limiter::bind(
        Policy::new("user:123")
            .with_max(5)
            .with_duration(Duration::from_secs(2)),
        &store,
    )?;

    println!("=== Fixed Window Rate Limiting Demo ===\n");
    println!("{}\n", limiter.inspect());

    for i in 1..=8 {
        let state = limiter.consume().await?;

        if state.is_exhausted() {
            println!(
                "Call {}: ❌ Rejected (window resets in {:.1}s)",
                i,
                state.seconds_until_reset(ratewindow::adapter::current_timestamp_ms())
            );
        } else {
            println!(
                "Call {}: ✅ Allowed (remaining: {}/{})",
                i, state.remaining, state.total
            );
        }
    }

    println!("\n--- Waiting 2 seconds for the window to roll over ---\n");
    tokio::time::sleep(Duration::from_secs(2)).await;

    let state = limiter.consume().await?;
    println!(
        "After rollover: ✅ Allowed (remaining: {}/{})",
        state.remaining, state.total
    );

    Ok(())
}
