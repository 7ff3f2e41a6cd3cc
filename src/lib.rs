//! Fixed-window rate limiting for Rust.
//!
//! `ratewindow` tracks how many calls an identifier has left in the
//! current window and rolls into a fresh window once the reset instant
//! passes. It provides:
//!
//! - **A two-operation adapter contract**: `peek` (read-only) and
//!   `consume` (decrement-with-floor), both returning a
//!   `{total, remaining, reset}` snapshot
//! - **Pluggable window stores**: in-process (`DashMap`-backed) and
//!   Redis-backed for multi-node deployments
//! - **Race-free shared counting**: the Redis adapter's
//!   check-and-decrement runs as one server-side Lua script, so
//!   concurrent callers never lose an update or drive the counter
//!   negative
//!
//! # Quick Start
//!
//! ```ignore
//! use ratewindow::{Limiter, MemoryStore, Policy};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!     let limiter = Limiter::bind(
//!         Policy::new("user:123")
//!             .with_max(100)
//!             .with_duration(Duration::from_secs(3600)),
//!         &store,
//!     ).unwrap();
//!
//!     let state = limiter.consume().await.unwrap();
//!
//!     if state.is_exhausted() {
//!         println!("Rate limited! Window resets at {}", state.reset);
//!     } else {
//!         println!("Allowed, {} of {} remaining", state.remaining, state.total);
//!     }
//! }
//! ```
//!
//! # Window Stores
//!
//! | Store | Scope | Coordination | Feature Flag |
//! |-------|-------|--------------|--------------|
//! | Memory | Single process | Map entry exclusivity | `memory` |
//! | Redis | Multi-node | Server-side Lua script | `redis` |
//!
//! # Feature Flags
//!
//! - `memory` (default): in-process window store
//! - `redis`: Redis-backed window store with connection pooling
//! - `full`: everything above

pub mod adapter;
pub mod error;
pub mod limiter;
pub mod policy;
pub mod window;

// Re-export main types
pub use adapter::{AdapterFactory, WindowAdapter};
pub use error::{ConfigError, ConnectionError, RateLimitError, Result, StorageError};
pub use limiter::Limiter;
pub use policy::{DEFAULT_DURATION, DEFAULT_MAX, Policy, PolicyBuilder};
pub use window::WindowState;

// Re-export store types
#[cfg(feature = "memory")]
pub use adapter::{MemoryAdapter, MemoryStore};

#[cfg(feature = "redis")]
pub use adapter::{RedisAdapter, RedisConfig, RedisStore};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adapter::{AdapterFactory, WindowAdapter};
    pub use crate::error::{RateLimitError, Result};
    pub use crate::limiter::Limiter;
    pub use crate::policy::Policy;
    pub use crate::window::WindowState;

    #[cfg(feature = "memory")]
    pub use crate::adapter::MemoryStore;

    #[cfg(feature = "redis")]
    pub use crate::adapter::{RedisConfig, RedisStore};
}
