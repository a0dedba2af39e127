//! Exclusive-only cross-process lock.

use super::acquire::{self, Request};
use super::guard::ProcessLockGuard;
use super::options::AcquireOptions;
use crate::backend::{ByteRange, FileLockBackend, LockMode, PlatformBackend};
use crate::error::{LockError, Result};
use crate::retry::{Sleeper, thread_sleeper};
use std::fmt;
use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// An exclusive advisory lock on a file, shared between processes.
///
/// # Example
///
/// ```no_run
/// use lockwright::{AcquireOptions, InterProcessLock};
///
/// let mut lock = InterProcessLock::new("/tmp/app/app.lock");
/// if lock.acquire(&AcquireOptions::non_blocking())? {
///     // Critical section
///     lock.release()?;
/// }
/// # Ok::<(), lockwright::LockError>(())
/// ```
pub struct InterProcessLock<B: FileLockBackend = PlatformBackend> {
    path: PathBuf,
    range: ByteRange,
    handle: Option<File>,
    acquired: bool,
    sleeper: Sleeper,
    _backend: PhantomData<fn() -> B>,
}

impl InterProcessLock {
    /// Create a lock over `path` using the platform backend.
    ///
    /// Nothing touches the filesystem until the first acquire.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_backend(path)
    }
}

impl<B: FileLockBackend> InterProcessLock<B> {
    /// Create a lock over `path` using backend `B`.
    pub fn with_backend(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            range: ByteRange::WHOLE_FILE,
            handle: None,
            acquired: false,
            sleeper: thread_sleeper(),
            _backend: PhantomData,
        }
    }

    /// Lock only `range` of the file instead of the whole file.
    pub fn with_range(mut self, range: ByteRange) -> Self {
        self.range = range;
        self
    }

    /// Replace the function used to wait between attempts.
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn range(&self) -> ByteRange {
        self.range
    }

    /// Whether this object currently holds the lock.
    pub fn is_acquired(&self) -> bool {
        self.acquired
    }

    /// Whether the lock file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Try to take the lock.
    ///
    /// Returns `Ok(false)` if the lock is held elsewhere and either
    /// `options.blocking` is off or `options.timeout` expired. Any OS failure
    /// other than contention is returned as [`LockError::Os`].
    ///
    /// Acquiring again while already held keeps the existing hold. On POSIX
    /// the repeat attempt succeeds; on Windows the handle's own lock counts as
    /// contention, so it returns `Ok(false)` while [`is_acquired`] stays
    /// `true`. Check [`is_acquired`], not the return value, in that case.
    ///
    /// [`is_acquired`]: Self::is_acquired
    pub fn acquire(&mut self, options: &AcquireOptions) -> Result<bool> {
        let was_acquired = self.acquired;
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => acquire::open::<B>(&self.path)?,
        };

        let result = acquire::acquire_on::<B>(
            &handle,
            Request {
                path: &self.path,
                mode: LockMode::Exclusive,
                range: self.range,
                options,
                sleeper: &self.sleeper,
            },
        );

        let gotten = matches!(result, Ok(true));
        if gotten || was_acquired {
            self.handle = Some(handle);
            self.acquired = true;
        } else {
            acquire::discard::<B>(handle, &self.path);
        }
        result
    }

    /// Release the lock and close the lock file handle.
    ///
    /// Fails with [`LockError::Usage`] if the lock is not held. The handle is
    /// closed (dropping the OS lock) even if unlocking reports an error.
    pub fn release(&mut self) -> Result<()> {
        if !self.acquired {
            return Err(LockError::Usage(
                "unable to release an unacquired lock".to_string(),
            ));
        }
        self.acquired = false;
        match self.handle.take() {
            Some(handle) => acquire::release_handle::<B>(handle, &self.path, self.range),
            None => Ok(()),
        }
    }

    /// Acquire and return a guard that releases on drop.
    ///
    /// Fails with [`LockError::NotAcquired`] when the lock was not obtained.
    pub fn lock(&mut self, options: &AcquireOptions) -> Result<ProcessLockGuard<'_, B>> {
        if !self.acquire(options)? {
            return Err(LockError::NotAcquired(self.path.clone()));
        }
        Ok(ProcessLockGuard::new(self))
    }

    /// Run `f` while holding the lock.
    ///
    /// The lock is released on every exit path. A release failure after `f`
    /// returns normally is reported as an error.
    pub fn locked<R>(&mut self, options: &AcquireOptions, f: impl FnOnce() -> R) -> Result<R> {
        let guard = self.lock(options)?;
        let value = f();
        guard.release()?;
        Ok(value)
    }
}

impl<B: FileLockBackend> fmt::Debug for InterProcessLock<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterProcessLock")
            .field("path", &self.path)
            .field("range", &self.range)
            .field("acquired", &self.acquired)
            .finish_non_exhaustive()
    }
}

/// Run `f` while holding an exclusive lock on `path`.
///
/// The closure form of wrapping a function call in a cross-process lock.
pub fn interprocess_locked<R>(
    path: impl Into<PathBuf>,
    options: &AcquireOptions,
    f: impl FnOnce() -> R,
) -> Result<R> {
    InterProcessLock::new(path).locked(options, f)
}
