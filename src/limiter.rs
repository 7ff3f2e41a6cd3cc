//! Limiter facade binding a policy to a window adapter.
//!
//! The `Limiter` is the entry point most callers use: it validates the
//! policy once at construction, then forwards `peek`/`consume` to the
//! bound adapter.
//!
//! # Example
//!
//! ```ignore
//! use ratewindow::{Limiter, MemoryStore, Policy};
//! use std::time::Duration;
//!
//! let store = MemoryStore::new();
//! let limiter = Limiter::bind(
//!     Policy::new("user:123").with_max(5).with_duration(Duration::from_secs(100)),
//!     &store,
//! )?;
//!
//! let state = limiter.consume().await?;
//! if state.is_exhausted() {
//!     // reject the action
//! }
//! ```

use std::fmt;

use crate::adapter::{AdapterFactory, WindowAdapter};
use crate::error::Result;
use crate::policy::Policy;
use crate::window::WindowState;

/// Facade over one identifier's rate limit.
///
/// Holds the validated [`Policy`] and the adapter it was bound to. The
/// adapter choice (local vs. shared) is made at construction through an
/// [`AdapterFactory`]; the facade itself adds no locking or retry logic.
#[derive(Debug, Clone)]
pub struct Limiter<A> {
    policy: Policy,
    adapter: A,
}

impl<A: WindowAdapter> Limiter<A> {
    /// Bind `policy` to an adapter produced by `factory`.
    ///
    /// Fails with a `ConfigError` if the identifier is empty or the
    /// window parameters are out of range.
    pub fn bind<F>(policy: Policy, factory: &F) -> Result<Self>
    where
        F: AdapterFactory<Adapter = A>,
    {
        policy.validate()?;
        let adapter = factory.bind(policy.clone());
        Ok(Self { policy, adapter })
    }

    /// Read the current window without consuming a call.
    pub async fn peek(&self) -> Result<WindowState> {
        self.adapter.peek().await
    }

    /// Consume one call from the window.
    ///
    /// An exhausted window is a normal result with `remaining == 0`; the
    /// caller is responsible for rejecting the action.
    pub async fn consume(&self) -> Result<WindowState> {
        self.adapter.consume().await
    }

    /// `peek` with the result delivered to a callback.
    ///
    /// A boundary shim for callback-style callers; `peek` is the
    /// primary interface.
    pub async fn peek_with<F>(&self, callback: F)
    where
        F: FnOnce(Result<WindowState>),
    {
        callback(self.peek().await);
    }

    /// `consume` with the result delivered to a callback.
    pub async fn consume_with<F>(&self, callback: F)
    where
        F: FnOnce(Result<WindowState>),
    {
        callback(self.consume().await);
    }

    /// Diagnostic summary of the bound policy.
    pub fn inspect(&self) -> String {
        self.to_string()
    }

    /// Get the bound policy.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Get the bound adapter.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }
}

impl<A> fmt::Display for Limiter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Limiter identifier='{}' duration={}ms max={}>",
            self.policy.identifier(),
            self.policy.duration_millis(),
            self.policy.max()
        )
    }
}

#[cfg(feature = "redis")]
static POOL_DEPRECATION: std::sync::Once = std::sync::Once::new();

#[cfg(feature = "redis")]
impl Limiter<crate::adapter::RedisAdapter> {
    /// Build a Redis-backed limiter directly from a raw connection pool.
    ///
    /// Compatibility path for callers that hold a `deadpool_redis::Pool`
    /// themselves. Behaves identically to constructing a
    /// [`RedisStore`](crate::adapter::RedisStore) and binding it
    /// explicitly, which is what new code should do.
    #[deprecated(
        since = "0.1.0",
        note = "construct a RedisStore and pass it to Limiter::bind"
    )]
    pub fn from_pool(policy: Policy, pool: deadpool_redis::Pool) -> Result<Self> {
        POOL_DEPRECATION.call_once(|| {
            tracing::warn!(
                "initializing a Limiter directly from a connection pool is deprecated \
                 and will be removed in a future release; construct a RedisStore and \
                 pass it to Limiter::bind instead"
            );
        });

        let store = crate::adapter::RedisStore::from_pool(pool);
        Self::bind(policy, &store)
    }
}
