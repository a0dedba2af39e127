//! Lockwright: reader-writer locks for threads and advisory file locks for
//! processes.
//!
//! - [`ReaderWriterLock`]: in-process, reentrant, write-preferring
//! - [`InterProcessLock`]: exclusive lock on a file, shared between processes
//! - [`InterProcessReaderWriterLock`]: shared/exclusive lock on a file
//!
//! File locks are advisory and are dropped by the OS when the holding process
//! exits, so a crashed holder never leaves a stale lock behind.

pub mod backend;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod process_lock;
pub mod retry;
pub mod rwlock;
pub mod timing;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{ByteRange, FileLockBackend, LockMode, PlatformBackend};
pub use config::Settings;
pub use error::{LockError, Result};
pub use process_lock::{
    AcquireOptions, InterProcessLock, InterProcessReaderWriterLock, ProcessLockGuard,
    ProcessRwLockGuard, interprocess_locked,
};
pub use retry::RetryPolicy;
pub use rwlock::{Owner, ReadGuard, ReaderWriterLock, WriteGuard};
pub use timing::StopWatch;
