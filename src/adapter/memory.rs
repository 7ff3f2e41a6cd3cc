//! In-process window store.
//!
//! This adapter backs window state with a `DashMap` owned by the store
//! instance, so two stores never share state and two adapters bound from
//! the same store always do. Suitable for single-node deployments; state
//! lives for the lifetime of the process.

use std::sync::Arc;

use dashmap::DashMap;

use crate::adapter::{AdapterFactory, WindowAdapter, current_timestamp_ms};
use crate::error::Result;
use crate::policy::Policy;
use crate::window::WindowState;

/// In-process window store.
///
/// Operations against the same identifier serialize through the map's
/// per-entry exclusivity, so no additional locking is needed.
///
/// # Example
///
/// ```ignore
/// use ratewindow::{MemoryStore, Policy, AdapterFactory, WindowAdapter};
///
/// let store = MemoryStore::new();
/// let adapter = store.bind(Policy::new("user:123").with_max(10));
/// let state = adapter.consume().await?;
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    windows: Arc<DashMap<String, WindowState>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.windows.len())
            .finish()
    }
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of windows currently tracked.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Clear all windows.
    pub fn clear(&self) {
        self.windows.clear();
    }
}

impl AdapterFactory for MemoryStore {
    type Adapter = MemoryAdapter;

    fn bind(&self, policy: Policy) -> MemoryAdapter {
        MemoryAdapter {
            windows: self.windows.clone(),
            policy,
        }
    }
}

/// Adapter bound to one identifier within a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    windows: Arc<DashMap<String, WindowState>>,
    policy: Policy,
}

impl WindowAdapter for MemoryAdapter {
    async fn peek(&self) -> Result<WindowState> {
        let now = current_timestamp_ms();
        let max = self.policy.max();
        let duration_ms = self.policy.duration_millis();

        let entry = self
            .windows
            .entry(self.policy.identifier().to_owned())
            .and_modify(|state| {
                if state.is_expired(now) {
                    *state = WindowState::fresh(max, now, duration_ms);
                }
            })
            .or_insert_with(|| WindowState::fresh(max, now, duration_ms));

        Ok(entry.value().clone())
    }

    async fn consume(&self) -> Result<WindowState> {
        let now = current_timestamp_ms();
        let max = self.policy.max();
        let duration_ms = self.policy.duration_millis();

        // Rollover is checked before the exhaustion clamp so an exhausted
        // window still turns over at its boundary.
        let entry = self
            .windows
            .entry(self.policy.identifier().to_owned())
            .and_modify(|state| {
                if state.is_expired(now) {
                    *state = WindowState::fresh(max, now, duration_ms);
                }
                state.hit();
            })
            .or_insert_with(|| {
                let mut state = WindowState::fresh(max, now, duration_ms);
                state.hit();
                state
            });

        Ok(entry.value().clone())
    }
}
