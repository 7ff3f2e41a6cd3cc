//! Integration tests for the Redis-backed window adapter.
//!
//! These need a running Redis server (REDIS_URL or redis://localhost:6379)
//! and are ignored by default:
//!
//! ```sh
//! cargo test --features redis --test redis -- --ignored
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use deadpool_redis::redis::cmd;
use ratewindow::{AdapterFactory, Limiter, Policy, RedisAdapter, RedisConfig, RedisStore, WindowAdapter};

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs_f64()
}

async fn store() -> RedisStore {
    RedisStore::new(RedisConfig::new(redis_url()).with_prefix("ratewindow-test:"))
        .await
        .expect("redis server required for ignored tests")
}

/// Remove any state left behind for `id` by a previous run.
async fn clear(id: &str) {
    let pool = deadpool_redis::Config::from_url(redis_url())
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();
    let mut conn = pool.get().await.unwrap();
    let base = format!("ratewindow-test:{id}");
    let _: () = cmd("DEL")
        .arg(format!("{base}:count"))
        .arg(format!("{base}:limit"))
        .arg(format!("{base}:reset"))
        .query_async(&mut *conn)
        .await
        .unwrap();
}

fn bind(store: &RedisStore, id: &str, max: u64, duration_ms: u64) -> RedisAdapter {
    store.bind(
        Policy::new(id)
            .with_max(max)
            .with_duration(Duration::from_millis(duration_ms)),
    )
}

#[tokio::test]
#[ignore]
async fn test_counting_sequence() {
    clear("seq").await;
    let store = store().await;
    let adapter = bind(&store, "seq", 5, 100_000);

    let state = adapter.consume().await.unwrap();
    assert_eq!(state.total, 5);
    assert_eq!(state.remaining, 4);
    assert_eq!(adapter.consume().await.unwrap().remaining, 3);
    assert_eq!(adapter.consume().await.unwrap().remaining, 2);

    let left = adapter.peek().await.unwrap().reset - now_secs();
    assert!(left > 0.0 && left <= 100.0);
}

#[tokio::test]
#[ignore]
async fn test_exhaustion_clamps_at_zero() {
    clear("exhaust").await;
    let store = store().await;
    let adapter = bind(&store, "exhaust", 2, 10_000);

    assert_eq!(adapter.consume().await.unwrap().remaining, 1);
    assert_eq!(adapter.consume().await.unwrap().remaining, 0);
    assert_eq!(adapter.consume().await.unwrap().remaining, 0);
}

#[tokio::test]
#[ignore]
async fn test_duration_exceeded_resets_the_window() {
    clear("rollover").await;
    let store = store().await;
    let adapter = bind(&store, "rollover", 2, 1000);

    adapter.consume().await.unwrap();
    adapter.consume().await.unwrap();
    assert_eq!(adapter.consume().await.unwrap().remaining, 0);

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let state = adapter.consume().await.unwrap();
    assert_eq!(state.remaining, 1);
    let left = state.reset - now_secs();
    assert!(left > 0.0 && left < 2.0);
}

#[tokio::test]
#[ignore]
async fn test_all_key_ttls_stay_in_sync() {
    clear("ttls").await;
    let store = store().await;
    let adapter = bind(&store, "ttls", 2, 10_000);

    adapter.consume().await.unwrap();
    adapter.consume().await.unwrap();

    let (count_ttl, limit_ttl, reset_ttl) = adapter.key_ttls().await.unwrap();
    assert!(count_ttl > 0);
    assert_eq!(limit_ttl, count_ttl);
    assert_eq!(reset_ttl, count_ttl);
}

#[tokio::test]
#[ignore]
async fn test_stale_counter_without_companions_is_recreated() {
    clear("stale").await;
    let pool = deadpool_redis::Config::from_url(redis_url())
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();
    let mut conn = pool.get().await.unwrap();
    let _: () = cmd("SET")
        .arg("ratewindow-test:stale:count")
        .arg(1)
        .query_async(&mut *conn)
        .await
        .unwrap();

    let store = store().await;
    let adapter = bind(&store, "stale", 2, 10_000);

    // The reset marker is missing, so the counter must not be trusted.
    assert_eq!(adapter.consume().await.unwrap().remaining, 1);
    assert_eq!(adapter.consume().await.unwrap().remaining, 0);
    assert_eq!(adapter.consume().await.unwrap().remaining, 0);
}

#[tokio::test]
#[ignore]
async fn test_negative_counter_is_recreated() {
    clear("negative").await;
    let pool = deadpool_redis::Config::from_url(redis_url())
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();
    let mut conn = pool.get().await.unwrap();
    let base = "ratewindow-test:negative";
    let far_future = now_secs() + 1000.0;
    let _: () = cmd("SET")
        .arg(format!("{base}:count"))
        .arg(-3)
        .query_async(&mut *conn)
        .await
        .unwrap();
    let _: () = cmd("SET")
        .arg(format!("{base}:limit"))
        .arg(2)
        .query_async(&mut *conn)
        .await
        .unwrap();
    let _: () = cmd("SET")
        .arg(format!("{base}:reset"))
        .arg(far_future)
        .query_async(&mut *conn)
        .await
        .unwrap();

    let store = store().await;
    let adapter = bind(&store, "negative", 2, 10_000);

    let state = adapter.consume().await.unwrap();
    assert_eq!(state.remaining, 1, "stale negative value must not propagate");
}

#[tokio::test(flavor = "multi_thread")]
#[ignore]
async fn test_concurrent_clients_never_duplicate_a_value() {
    clear("race").await;
    let clients = 7usize;
    let max = 5u64;

    let store = store().await;

    let mut handles = Vec::new();
    for _ in 0..clients {
        let adapter = bind(&store, "race", max, 10_000);
        handles.push(tokio::spawn(
            async move { adapter.consume().await.unwrap() },
        ));
    }

    let mut remaining: Vec<u64> = Vec::new();
    for handle in handles {
        remaining.push(handle.await.unwrap().remaining);
    }
    remaining.sort_unstable();

    let mut expected: Vec<u64> = vec![0; clients - max as usize];
    expected.extend(0..max);
    assert_eq!(remaining, expected);
}

#[tokio::test]
#[ignore]
async fn test_deprecated_pool_construction_behaves_identically() {
    clear("legacy").await;
    let pool = deadpool_redis::Config::from_url(redis_url())
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();

    // Default prefix applies on this path, so clear those keys too.
    let mut conn = pool.get().await.unwrap();
    let _: () = cmd("DEL")
        .arg("limit:legacy:count")
        .arg("limit:legacy:limit")
        .arg("limit:legacy:reset")
        .query_async(&mut *conn)
        .await
        .unwrap();
    drop(conn);

    #[allow(deprecated)]
    let limiter = Limiter::from_pool(Policy::new("legacy").with_max(3), pool).unwrap();

    assert_eq!(limiter.consume().await.unwrap().remaining, 2);
    assert_eq!(limiter.consume().await.unwrap().remaining, 1);
}
