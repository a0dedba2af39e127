//! Cross-process advisory locks.
//!
//! This module implements two locks over a filesystem path:
//! - [`InterProcessLock`]: exclusive only
//! - [`InterProcessReaderWriterLock`]: shared (read) and exclusive (write)
//!
//! # Lock Files
//!
//! The lock file and its parent directories are created on demand. The file
//! is opened in append mode and its content is never read, written, or
//! truncated: only the OS lock held on the open handle matters. Lock files
//! are not deleted on release, since unlinking a file another process has
//! open is how two processes end up "holding" the same lock.
//!
//! # Crash Safety
//!
//! The lock lives exactly as long as the open handle. If the holding process
//! dies, the OS closes the handle and the lock is gone. No recovery code is
//! needed.
//!
//! # Threads
//!
//! These locks coordinate processes, not threads. Within one process POSIX
//! record locks never conflict, and closing any handle on a lock file drops
//! every lock the process holds on it. Layer an in-process
//! [`ReaderWriterLock`](crate::rwlock::ReaderWriterLock) on top when threads
//! of one process also need to exclude each other.
//!
//! # RAII Guards
//!
//! Scoped acquisitions return guards that release on drop. If release fails
//! during drop, a warning is logged but nothing panics; call the guard's
//! `release()` to handle the error explicitly.

mod acquire;
mod exclusive;
mod guard;
mod options;
mod shared;

#[cfg(test)]
mod tests;

pub use exclusive::{InterProcessLock, interprocess_locked};
pub use guard::{ProcessLockGuard, ProcessRwLockGuard};
pub use options::{AcquireOptions, DEFAULT_DELAY, DEFAULT_MAX_DELAY};
pub use shared::InterProcessReaderWriterLock;
