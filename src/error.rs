//! Error types for lockwright.
//!
//! Uses thiserror for derive macros. Contention is deliberately absent from
//! the library-level variants: a lock that is held elsewhere makes `acquire`
//! return `Ok(false)`, never an error.

use crate::exit_codes;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lockwright operations.
///
/// Each variant maps to a specific process exit code for the CLI.
#[derive(Error, Debug)]
pub enum LockError {
    /// A precondition on acquisition parameters was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Lock discipline was violated (release without acquire, double release).
    #[error("{0}")]
    Usage(String),

    /// A thread holding only read access tried to take write access.
    #[error("{0}")]
    Reentrancy(String),

    /// An OS call on the lock file failed for a reason other than contention.
    #[error("lock file operation on `{}` failed: {source}", path.display())]
    Os {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A scoped acquisition did not obtain the lock.
    #[error("unable to acquire lock `{}`", .0.display())]
    NotAcquired(PathBuf),

    /// The lock is held elsewhere and the caller chose not to wait (CLI only).
    #[error("lock `{}` is held by another process", .0.display())]
    Busy(PathBuf),

    /// The configuration file could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The command wrapped by `exec` could not be started.
    #[error("command failed: {0}")]
    Command(String),
}

impl LockError {
    pub(crate) fn os(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LockError::Os {
            path: path.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockError::InvalidArgument(_)
            | LockError::Usage(_)
            | LockError::Reentrancy(_)
            | LockError::Config(_)
            | LockError::Command(_) => exit_codes::USER_ERROR,
            LockError::Os { .. } => exit_codes::OS_FAILURE,
            LockError::NotAcquired(_) | LockError::Busy(_) => exit_codes::LOCK_BUSY,
        }
    }
}

/// Result type alias for lockwright operations.
pub type Result<T> = std::result::Result<T, LockError>;
