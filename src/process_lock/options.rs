//! Acquisition parameters shared by the cross-process locks.

use crate::error::{LockError, Result};
use std::time::Duration;

/// Default step added to the wait after each failed attempt.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(10);

/// Default cap on the wait between attempts.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(100);

/// How hard `acquire` tries.
///
/// After the `n`th failed attempt a blocking acquire sleeps for
/// `min(n * delay, max_delay)` and tries again, until it succeeds or
/// `timeout` has elapsed. A non-blocking acquire makes exactly one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireOptions {
    pub blocking: bool,
    pub delay: Duration,
    pub max_delay: Duration,
    pub timeout: Option<Duration>,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            blocking: true,
            delay: DEFAULT_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            timeout: None,
        }
    }
}

impl AcquireOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a single attempt and report contention immediately.
    pub fn non_blocking() -> Self {
        Self {
            blocking: false,
            ..Self::default()
        }
    }

    /// Build options from seconds, rejecting negative or non-finite values.
    pub fn from_secs(delay: f64, max_delay: f64, timeout: Option<f64>) -> Result<Self> {
        Ok(Self {
            blocking: true,
            delay: secs("delay", delay)?,
            max_delay: secs("max delay", max_delay)?,
            timeout: timeout.map(|t| secs("timeout", t)).transpose()?,
        })
    }

    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }
}

pub(crate) fn secs(name: &str, value: f64) -> Result<Duration> {
    if !value.is_finite() || value < 0.0 {
        return Err(LockError::InvalidArgument(format!(
            "{} must be greater than or equal to zero (got {})",
            name, value
        )));
    }
    Duration::try_from_secs_f64(value)
        .map_err(|e| LockError::InvalidArgument(format!("{} is out of range: {}", name, e)))
}
