//! Exit code constants for the lockwright CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad config, lock misuse)
//! - 2: Operating system failure while locking
//! - 3: Lock busy (held elsewhere, no wait or timeout expired)
//!
//! `exec` exits with the wrapped command's own status once the lock is held.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or lock misuse.
pub const USER_ERROR: i32 = 1;

/// OS failure: the locking call failed for a reason other than contention.
pub const OS_FAILURE: i32 = 2;

/// Lock busy: the lock is held elsewhere and was not obtained.
pub const LOCK_BUSY: i32 = 3;
