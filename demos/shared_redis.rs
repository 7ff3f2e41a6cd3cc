//! Redis-backed rate limiting shared across processes.
//!
//! Needs a running Redis server. Run with:
//! ```
//! cargo run --example shared_redis --features redis
//! ```

use ratewindow::{Limiter, Policy, RedisConfig, RedisStore};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

    let store = RedisStore::new(RedisConfig::new(url).with_prefix("demo:limit:")).await?;

    // Every process binding this identifier shares the same three window
    // keys, and the server-side script keeps their decrements ordered.
    let limiter = Limiter::bind(
        Policy::new("api-key:42")
            .with_max(10)
            .with_duration(Duration::from_secs(60)),
        &store,
    )?;

    println!("{}\n", limiter.inspect());

    for i in 1..=12 {
        let state = limiter.consume().await?;

        if state.is_exhausted() {
            println!("Call {}: ❌ Rejected until {}", i, state.reset);
        } else {
            println!(
                "Call {}: ✅ Allowed (remaining: {}/{})",
                i, state.remaining, state.total
            );
        }
    }

    // Read-only view for dashboards: no call consumed.
    let state = limiter.peek().await?;
    for (name, value) in state.to_headers() {
        println!("{name}: {value}");
    }

    Ok(())
}
