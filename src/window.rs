//! Window state snapshot returned by every adapter operation.

use serde::{Deserialize, Serialize};

/// Snapshot of one identifier's fixed window.
///
/// Every adapter operation resolves to one of these. `remaining` is
/// clamped to `[0, total]` and `reset` is UTC epoch seconds (fractional)
/// marking when the current window ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowState {
    /// Configured maximum calls per window.
    pub total: u64,

    /// Calls left in the current window.
    pub remaining: u64,

    /// UTC epoch seconds when the window ends and a new one begins.
    pub reset: f64,
}

impl WindowState {
    /// Create a fresh window with the full allowance.
    ///
    /// The reset instant is stamped `(now_ms + duration_ms) / 1000`, so it
    /// is always in the future relative to the creation instant.
    pub fn fresh(max: u64, now_ms: u64, duration_ms: u64) -> Self {
        Self {
            total: max,
            remaining: max,
            reset: (now_ms + duration_ms) as f64 / 1000.0,
        }
    }

    /// Whether the window's reset instant has passed.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms as f64 / 1000.0 > self.reset
    }

    /// Whether the allowance is used up.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Consume one slot, clamping at zero.
    pub fn hit(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Seconds until the window resets, never negative.
    pub fn seconds_until_reset(&self, now_ms: u64) -> f64 {
        (self.reset - now_ms as f64 / 1000.0).max(0.0)
    }

    /// Convert to HTTP headers.
    ///
    /// Returns a vector of (header_name, header_value) pairs. The reset
    /// header carries whole epoch seconds.
    pub fn to_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("X-RateLimit-Limit", self.total.to_string()),
            ("X-RateLimit-Remaining", self.remaining.to_string()),
            ("X-RateLimit-Reset", (self.reset as u64).to_string()),
        ]
    }
}
