//! Settings struct and its defaults.

use crate::process_lock::{DEFAULT_DELAY, DEFAULT_MAX_DELAY};
use serde::{Deserialize, Serialize};

/// How a lock should be acquired, as read from a settings file.
///
/// ```yaml
/// blocking: true
/// delay_secs: 0.01
/// max_delay_secs: 0.1
/// timeout_secs: 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keep retrying while the lock is held elsewhere.
    pub blocking: bool,

    /// Base delay between attempts, in seconds.
    pub delay_secs: f64,

    /// Upper bound on the delay between attempts, in seconds.
    pub max_delay_secs: f64,

    /// Give up after this many seconds. Absent means wait forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blocking: true,
            delay_secs: DEFAULT_DELAY.as_secs_f64(),
            max_delay_secs: DEFAULT_MAX_DELAY.as_secs_f64(),
            timeout_secs: None,
        }
    }
}
