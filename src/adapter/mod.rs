//! Window adapter trait and implementations.
//!
//! This module defines the `WindowAdapter` contract every backing
//! implementation must satisfy, along with built-in implementations for
//! in-process and Redis-backed window state.

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "memory")]
pub use memory::{MemoryAdapter, MemoryStore};

#[cfg(feature = "redis")]
pub use redis::{RedisAdapter, RedisConfig, RedisStore};

use std::future::Future;

use crate::error::Result;
use crate::policy::Policy;
use crate::window::WindowState;

/// Contract for one identifier's window state.
///
/// An adapter is bound to a single [`Policy`] at construction and exposes
/// exactly two operations, both resolving to a [`WindowState`] snapshot.
/// Implementations must be thread-safe (`Send + Sync`).
///
/// Both operations lazily create the window on first access and roll it
/// to a fresh one once the stored reset instant has passed. Rollover is
/// detected on read, so a stale window still visible in the store (TTL
/// granularity, clock skew) is replaced rather than reported.
pub trait WindowAdapter: Send + Sync + 'static {
    /// Read the current window without consuming a call.
    ///
    /// Creates the window with the full allowance if absent. Never
    /// changes `remaining`.
    fn peek(&self) -> impl Future<Output = Result<WindowState>> + Send;

    /// Consume one call from the window.
    ///
    /// Like `peek` for creation and rollover, except the triggering call
    /// counts: a freshly created or rolled window reports `max - 1`. An
    /// exhausted window is returned unchanged with `remaining == 0`,
    /// never negative.
    fn consume(&self) -> impl Future<Output = Result<WindowState>> + Send;
}

impl<A: WindowAdapter + ?Sized> WindowAdapter for std::sync::Arc<A> {
    async fn peek(&self) -> Result<WindowState> {
        (**self).peek().await
    }

    async fn consume(&self) -> Result<WindowState> {
        (**self).consume().await
    }
}

impl<A: WindowAdapter + ?Sized> WindowAdapter for Box<A> {
    async fn peek(&self) -> Result<WindowState> {
        (**self).peek().await
    }

    async fn consume(&self) -> Result<WindowState> {
        (**self).consume().await
    }
}

/// Factory binding a [`Policy`] to a concrete adapter.
///
/// Stores implement this so one store instance can hand out any number
/// of bound adapters sharing its state.
pub trait AdapterFactory {
    /// The adapter type this factory produces.
    type Adapter: WindowAdapter;

    /// Bind `policy` to an adapter backed by this store.
    fn bind(&self, policy: Policy) -> Self::Adapter;
}

/// Get the current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
