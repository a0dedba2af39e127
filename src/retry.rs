//! Retry loop with linearly increasing, capped delays.
//!
//! The operation decides when to give up: it returns [`Attempt::Retry`] to ask
//! for another try and [`Attempt::Done`] (or an error) to stop. Checking a
//! [`StopWatch`](crate::timing::StopWatch) deadline is the operation's job.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Function used to wait between attempts.
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// A sleeper backed by [`std::thread::sleep`].
pub fn thread_sleeper() -> Sleeper {
    Arc::new(std::thread::sleep)
}

/// Result of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Stop retrying and return this value.
    Done(T),
    /// Sleep, then try again.
    Retry,
}

/// Final value of a retry loop plus the number of attempts it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub attempts: u32,
}

/// Drives an operation until it produces a definitive result.
///
/// Before attempt `n + 1` the policy sleeps for `min(n * delay, max_delay)`.
#[derive(Clone)]
pub struct RetryPolicy {
    delay: Duration,
    max_delay: Duration,
    sleeper: Sleeper,
}

impl RetryPolicy {
    /// Create a policy. A `max_delay` below `delay` is raised to `delay`.
    pub fn new(delay: Duration, max_delay: Duration) -> Self {
        Self {
            delay,
            max_delay: max_delay.max(delay),
            sleeper: thread_sleeper(),
        }
    }

    /// Replace the function used to wait between attempts.
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay to wait after `attempts` failed attempts.
    pub fn backoff(&self, attempts: u32) -> Duration {
        self.delay.saturating_mul(attempts).min(self.max_delay)
    }

    /// Run `op` until it returns `Done` or an error.
    ///
    /// `op` receives the 1-based attempt number. Errors are returned as-is and
    /// never retried.
    pub fn run<T, E, F>(&self, mut op: F) -> Result<Outcome<T>, E>
    where
        F: FnMut(u32) -> Result<Attempt<T>, E>,
    {
        let mut attempts: u32 = 1;
        loop {
            match op(attempts)? {
                Attempt::Done(value) => return Ok(Outcome { value, attempts }),
                Attempt::Retry => {
                    let wait = self.backoff(attempts);
                    tracing::trace!(attempts, wait_ms = wait.as_millis() as u64, "retrying");
                    (self.sleeper)(wait);
                    attempts = attempts.saturating_add(1);
                }
            }
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("delay", &self.delay)
            .field("max_delay", &self.max_delay)
            .finish_non_exhaustive()
    }
}
