//! Elapsed-time tracking against an optional deadline.

use std::time::{Duration, Instant};

/// A basic stop watch with an optional duration.
///
/// A watch without a duration never expires. `elapsed()` is measured on the
/// monotonic clock, so it never goes backwards.
#[derive(Debug, Clone)]
pub struct StopWatch {
    duration: Option<Duration>,
    started_at: Instant,
    stopped_at: Option<Instant>,
}

impl StopWatch {
    /// Create a watch that starts running immediately.
    pub fn start(duration: Option<Duration>) -> Self {
        Self {
            duration,
            started_at: Instant::now(),
            stopped_at: None,
        }
    }

    /// Restart the watch from now, clearing any stop time.
    pub fn restart(&mut self) {
        self.started_at = Instant::now();
        self.stopped_at = None;
    }

    /// Freeze `elapsed()` at the current instant.
    pub fn stop(&mut self) {
        self.stopped_at = Some(Instant::now());
    }

    /// Time since the watch was started (or until it was stopped).
    pub fn elapsed(&self) -> Duration {
        let end = self.stopped_at.unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started_at)
    }

    /// The configured duration, if any.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Time left before expiry; `None` for an unbounded watch.
    pub fn remaining(&self) -> Option<Duration> {
        self.duration
            .map(|duration| duration.saturating_sub(self.elapsed()))
    }

    /// Whether more than the configured duration has elapsed.
    pub fn expired(&self) -> bool {
        match self.duration {
            None => false,
            Some(duration) => self.elapsed() > duration,
        }
    }
}
