//! Platform file-locking capability.
//!
//! Cross-process locks are advisory locks held on an open file handle. The
//! operating system drops them when the handle is closed, which also happens
//! when the owning process dies for any reason. That is the whole crash
//! recovery story: nothing is ever written to the lock file.
//!
//! # Platform Behavior
//!
//! - **POSIX**: `fcntl(F_SETLK)` record locks, `F_RDLCK` for shared and
//!   `F_WRLCK` for exclusive. Record locks belong to the process, so two
//!   handles in one process never conflict with each other, and closing *any*
//!   handle on the file drops every lock the process holds on it.
//! - **Windows**: `LockFileEx` with `LOCKFILE_FAIL_IMMEDIATELY`;
//!   `ERROR_LOCK_VIOLATION` is reported as contention.
//!
//! Both implementations are non-blocking so that waiting stays in the
//! caller's retry loop.

#[cfg(unix)]
mod posix;
#[cfg(windows)]
mod windows;


#[cfg(unix)]
pub use posix::PosixBackend;
#[cfg(windows)]
pub use windows::WindowsBackend;

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// The backend for the platform this crate was built for.
#[cfg(unix)]
pub type PlatformBackend = PosixBackend;

/// The backend for the platform this crate was built for.
#[cfg(windows)]
pub type PlatformBackend = WindowsBackend;

/// Shared (read) or exclusive (write) lock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    Shared,
    Exclusive,
}

impl LockMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockMode::Shared => "shared",
            LockMode::Exclusive => "exclusive",
        }
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self, LockMode::Exclusive)
    }
}

/// Byte range of the lock file covered by an advisory lock.
///
/// A zero `len` means "from `start` to the end of the file, however large it
/// grows", which is how POSIX spells a whole-file lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: u64,
    pub len: u64,
}

impl ByteRange {
    /// The whole file.
    pub const WHOLE_FILE: ByteRange = ByteRange { start: 0, len: 0 };

    pub fn new(start: u64, len: u64) -> Self {
        Self { start, len }
    }

    pub fn is_whole_file(&self) -> bool {
        *self == Self::WHOLE_FILE
    }
}

impl Default for ByteRange {
    fn default() -> Self {
        Self::WHOLE_FILE
    }
}

/// Operations a platform must provide for cross-process locking.
///
/// Handles are plain [`File`]s. Every method is an associated function: the
/// platform is fixed per build, so there is no backend state to carry.
pub trait FileLockBackend {
    /// Open (creating if needed) the lock file.
    ///
    /// Missing parent directories are created. The file is opened in append
    /// mode, so existing content is never truncated or overwritten, which
    /// also defuses a symlink planted at the lock path pointing at a file
    /// that matters.
    fn open_handle(path: &Path) -> io::Result<File> {
        ensure_parent_dir(path)?;
        OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
    }

    /// Attempt a non-blocking lock.
    ///
    /// Returns `Ok(false)` when the lock is held elsewhere; any other
    /// failure is returned as an error.
    fn try_lock(handle: &File, mode: LockMode, range: ByteRange) -> io::Result<bool>;

    /// Release a lock previously taken with [`try_lock`](Self::try_lock).
    fn unlock(handle: &File, range: ByteRange) -> io::Result<()>;

    /// Close the handle, implicitly releasing anything still locked on it.
    fn close_handle(handle: File) -> io::Result<()> {
        drop(handle);
        Ok(())
    }
}

/// Create the lock file's parent directory if it does not exist yet.
///
/// Returns whether a directory was created. An existing directory is not an
/// error; an existing non-directory is.
pub fn ensure_parent_dir(path: &Path) -> io::Result<bool> {
    let Some(parent) = path.parent() else {
        return Ok(false);
    };
    if parent.as_os_str().is_empty() || parent.is_dir() {
        return Ok(false);
    }
    match fs::create_dir_all(parent) {
        Ok(()) => {
            tracing::info!(path = %parent.display(), "created lock base path");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && parent.is_dir() => Ok(false),
        Err(e) => Err(e),
    }
}
