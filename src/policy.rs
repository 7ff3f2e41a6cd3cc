//! Policy configuration for a rate-limited subject.
//!
//! A `Policy` binds an identifier to the window parameters: how many
//! calls are allowed (`max`) over what window (`duration`).
//!
//! # Examples
//!
//! ```ignore
//! use ratewindow::Policy;
//! use std::time::Duration;
//!
//! // Defaults: 2500 calls per hour
//! let policy = Policy::new("user:123");
//!
//! // 5 calls per 100 seconds
//! let policy = Policy::new("user:123")
//!     .with_max(5)
//!     .with_duration(Duration::from_secs(100));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default maximum calls per window.
pub const DEFAULT_MAX: u64 = 2500;

/// Default window duration (1 hour).
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3_600_000);

/// Window parameters for one rate-limited subject.
///
/// Immutable for the lifetime of a bound limiter. The identifier
/// distinguishes one limited subject from another (e.g., a user id or a
/// client IP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Key distinguishing the limited subject.
    identifier: String,

    /// Maximum calls per window.
    max: u64,

    /// Window duration.
    duration: Duration,
}

impl Policy {
    /// Create a policy for `identifier` with the default allowance
    /// (2500 calls per hour).
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            max: DEFAULT_MAX,
            duration: DEFAULT_DURATION,
        }
    }

    /// Set the maximum calls per window.
    pub fn with_max(mut self, max: u64) -> Self {
        self.max = max;
        self
    }

    /// Set the window duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Get the identifier being limited.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Get the maximum calls per window.
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Get the window duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Get the window duration in milliseconds.
    pub fn duration_millis(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    /// Validate the policy, returning a `ConfigError` on the first
    /// violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.identifier.is_empty() {
            return Err(ConfigError::MissingIdentifier.into());
        }
        if self.max == 0 {
            return Err(ConfigError::InvalidMax("max must be greater than 0".into()).into());
        }
        if self.duration_millis() == 0 {
            return Err(
                ConfigError::InvalidDuration("duration must be at least 1ms".into()).into(),
            );
        }
        Ok(())
    }
}

/// Builder for creating policies with validation.
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    identifier: Option<String>,
    max: Option<u64>,
    duration: Option<Duration>,
}

impl PolicyBuilder {
    /// Create a new policy builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifier.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the maximum calls per window.
    pub fn max(mut self, max: u64) -> Self {
        self.max = Some(max);
        self
    }

    /// Set the window duration.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Build the policy, returning an error if invalid.
    pub fn build(self) -> Result<Policy> {
        let identifier = self.identifier.ok_or(ConfigError::MissingIdentifier)?;

        let mut policy = Policy::new(identifier);
        if let Some(max) = self.max {
            policy = policy.with_max(max);
        }
        if let Some(duration) = self.duration {
            policy = policy.with_duration(duration);
        }
        policy.validate()?;

        Ok(policy)
    }
}
