//! Redis-backed window store for multi-node rate limiting.
//!
//! Window state for one identifier lives in three cooperating keys:
//! `{prefix}{id}:count` (calls left), `{prefix}{id}:limit` (configured
//! ceiling) and `{prefix}{id}:reset` (epoch seconds of the boundary).
//! All three are created in one server-side Lua script with an identical
//! `PX` expiry, so they vanish from the store at the same instant, and
//! the check-and-decrement runs inside the script rather than as a
//! client-side read-then-write pair. One script invocation per call keeps
//! latency to a single round trip.

use std::sync::LazyLock;
use std::time::Duration;

use deadpool_redis::{
    Config, Connection, Pool, Runtime,
    redis::{Script, cmd, pipe},
};
use tracing::debug;

use crate::adapter::{AdapterFactory, WindowAdapter, current_timestamp_ms};
use crate::error::{ConnectionError, Result, StorageError};
use crate::policy::Policy;
use crate::window::WindowState;

/// Consume one call.
///
/// KEYS: count, limit, reset. ARGV: now_ms, max, duration_ms.
///
/// Missing or negative state and a passed boundary all mean the same
/// thing: start a fresh window, with the triggering call occupying one
/// slot. An exhausted live window is returned unchanged. `DECR` leaves
/// the key's TTL alone, so the three expiries set at creation stay in
/// lockstep for the window's lifetime. The reset timestamp travels as a
/// string because Lua truncates returned numbers to integers.
const CONSUME_LUA: &str = r"
local count = tonumber(redis.call('GET', KEYS[1]))
local total = tonumber(redis.call('GET', KEYS[2]))
local reset = tonumber(redis.call('GET', KEYS[3]))
local now_ms = tonumber(ARGV[1])
local max = tonumber(ARGV[2])
local duration_ms = tonumber(ARGV[3])

if count == nil or reset == nil or count < 0 or now_ms / 1000 > reset then
    local remaining = max - 1
    local fresh_reset = tostring((now_ms + duration_ms) / 1000)
    redis.call('SET', KEYS[1], remaining, 'PX', duration_ms)
    redis.call('SET', KEYS[2], max, 'PX', duration_ms)
    redis.call('SET', KEYS[3], fresh_reset, 'PX', duration_ms)
    return {remaining, max, fresh_reset}
end

if count == 0 then
    return {0, total or max, tostring(reset)}
end

local remaining = redis.call('DECR', KEYS[1])
return {remaining, total or max, tostring(reset)}
";

/// Read the window without consuming.
///
/// Same creation and rollover handling as the consume script, minus the
/// decrement: a fresh window reports the full allowance.
const PEEK_LUA: &str = r"
local count = tonumber(redis.call('GET', KEYS[1]))
local total = tonumber(redis.call('GET', KEYS[2]))
local reset = tonumber(redis.call('GET', KEYS[3]))
local now_ms = tonumber(ARGV[1])
local max = tonumber(ARGV[2])
local duration_ms = tonumber(ARGV[3])

if count == nil or reset == nil or count < 0 or now_ms / 1000 > reset then
    local fresh_reset = tostring((now_ms + duration_ms) / 1000)
    redis.call('SET', KEYS[1], max, 'PX', duration_ms)
    redis.call('SET', KEYS[2], max, 'PX', duration_ms)
    redis.call('SET', KEYS[3], fresh_reset, 'PX', duration_ms)
    return {max, max, fresh_reset}
end

return {count, total or max, tostring(reset)}
";

static CONSUME_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(CONSUME_LUA));
static PEEK_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(PEEK_LUA));

/// Redis storage configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Connection pool size
    pub pool_size: usize,
    /// Key prefix for window keys
    pub key_prefix: String,
    /// Connection timeout
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            key_prefix: "limit:".to_string(),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Create a new Redis configuration.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the pool size.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }
}

/// Redis-backed window store shared across processes and nodes.
///
/// # Example
///
/// ```ignore
/// use ratewindow::{RedisStore, RedisConfig, Policy, AdapterFactory};
///
/// let config = RedisConfig::new("redis://localhost:6379")
///     .with_prefix("myapp:limit:")
///     .with_pool_size(20);
///
/// let store = RedisStore::new(config).await?;
/// let adapter = store.bind(Policy::new("user:123"));
/// ```
pub struct RedisStore {
    pool: Pool,
    key_prefix: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

impl RedisStore {
    /// Create a new Redis store from configuration.
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;

        // Test connection
        let mut conn = pool
            .get()
            .await
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;
        let _: () = cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            pool,
            key_prefix: config.key_prefix,
        })
    }

    /// Create a new Redis store from a URL.
    pub async fn from_url(url: impl Into<String>) -> Result<Self> {
        Self::new(RedisConfig::new(url)).await
    }

    /// Wrap an existing connection pool with the default key prefix.
    ///
    /// No connectivity check is performed; failures surface on first use.
    pub fn from_pool(pool: Pool) -> Self {
        Self {
            pool,
            key_prefix: RedisConfig::default().key_prefix,
        }
    }
}

impl AdapterFactory for RedisStore {
    type Adapter = RedisAdapter;

    fn bind(&self, policy: Policy) -> RedisAdapter {
        let base = format!("{}{}", self.key_prefix, policy.identifier());
        RedisAdapter {
            pool: self.pool.clone(),
            count_key: format!("{base}:count"),
            limit_key: format!("{base}:limit"),
            reset_key: format!("{base}:reset"),
            policy,
        }
    }
}

/// Adapter bound to one identifier's three window keys.
#[derive(Clone)]
pub struct RedisAdapter {
    pool: Pool,
    policy: Policy,
    count_key: String,
    limit_key: String,
    reset_key: String,
}

impl std::fmt::Debug for RedisAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisAdapter")
            .field("identifier", &self.policy.identifier())
            .finish()
    }
}

impl RedisAdapter {
    /// Get a connection from the pool.
    async fn get_conn(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|_| StorageError::PoolExhausted.into())
    }

    /// Run one of the window scripts and decode its reply.
    async fn run_script(&self, script: &Script) -> Result<WindowState> {
        let mut conn = self.get_conn().await?;
        let now = current_timestamp_ms();

        debug!(identifier = self.policy.identifier(), "running window script");

        let (remaining, total, reset): (i64, i64, String) = script
            .key(&self.count_key)
            .key(&self.limit_key)
            .key(&self.reset_key)
            .arg(now)
            .arg(self.policy.max())
            .arg(self.policy.duration_millis())
            .invoke_async(&mut *conn)
            .await
            .map_err(|e| StorageError::operation_failed(e.to_string(), true))?;

        let reset = reset
            .parse::<f64>()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        Ok(WindowState {
            total: total as u64,
            remaining: remaining.max(0) as u64,
            reset,
        })
    }

    /// Read the remaining TTL of each window key, in milliseconds.
    ///
    /// Returns (count, limit, reset) TTLs as reported by `PTTL`; a key
    /// with no expiry yields -1 and a missing key -2. All three are equal
    /// for a live window.
    pub async fn key_ttls(&self) -> Result<(i64, i64, i64)> {
        let mut conn = self.get_conn().await?;

        let ttls: (i64, i64, i64) = pipe()
            .pttl(&self.count_key)
            .pttl(&self.limit_key)
            .pttl(&self.reset_key)
            .query_async(&mut *conn)
            .await
            .map_err(|e| StorageError::operation_failed(e.to_string(), true))?;

        Ok(ttls)
    }
}

impl WindowAdapter for RedisAdapter {
    async fn peek(&self) -> Result<WindowState> {
        self.run_script(&PEEK_SCRIPT).await
    }

    async fn consume(&self) -> Result<WindowState> {
        self.run_script(&CONSUME_SCRIPT).await
    }
}
