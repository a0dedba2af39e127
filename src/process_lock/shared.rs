//! Shared/exclusive cross-process lock.

use super::acquire::{self, Request};
use super::guard::ProcessRwLockGuard;
use super::options::AcquireOptions;
use crate::backend::{ByteRange, FileLockBackend, LockMode, PlatformBackend};
use crate::error::{LockError, Result};
use crate::retry::{Sleeper, thread_sleeper};
use std::fmt;
use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A reader-writer advisory lock on a file, shared between processes.
///
/// Any number of processes may hold the read lock at once; the write lock
/// excludes everyone else. Each acquire opens its own handle and each
/// release closes it. There is no reentrancy tracking: one object holds at
/// most one acquisition, in either mode, at a time. Acquiring while it
/// already holds one fails with [`LockError::Usage`].
pub struct InterProcessReaderWriterLock<B: FileLockBackend = PlatformBackend> {
    path: PathBuf,
    read_handle: Option<File>,
    write_handle: Option<File>,
    sleeper: Sleeper,
    _backend: PhantomData<fn() -> B>,
}

impl InterProcessReaderWriterLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_backend(path)
    }
}

impl<B: FileLockBackend> InterProcessReaderWriterLock<B> {
    pub fn with_backend(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_handle: None,
            write_handle: None,
            sleeper: thread_sleeper(),
            _backend: PhantomData,
        }
    }

    /// Replace the function used to wait between attempts.
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn holds_read_lock(&self) -> bool {
        self.read_handle.is_some()
    }

    pub fn holds_write_lock(&self) -> bool {
        self.write_handle.is_some()
    }

    pub fn acquire_read_lock(&mut self, options: &AcquireOptions) -> Result<bool> {
        self.acquire(LockMode::Shared, options)
    }

    pub fn acquire_write_lock(&mut self, options: &AcquireOptions) -> Result<bool> {
        self.acquire(LockMode::Exclusive, options)
    }

    pub fn release_read_lock(&mut self) -> Result<()> {
        self.release(LockMode::Shared)
    }

    pub fn release_write_lock(&mut self) -> Result<()> {
        self.release(LockMode::Exclusive)
    }

    /// Scoped shared lock; fails with [`LockError::NotAcquired`] if not obtained.
    pub fn read_lock(&mut self, options: &AcquireOptions) -> Result<ProcessRwLockGuard<'_, B>> {
        self.scoped(LockMode::Shared, options)
    }

    /// Scoped exclusive lock; fails with [`LockError::NotAcquired`] if not obtained.
    pub fn write_lock(&mut self, options: &AcquireOptions) -> Result<ProcessRwLockGuard<'_, B>> {
        self.scoped(LockMode::Exclusive, options)
    }

    /// Run `f` while holding the shared lock.
    pub fn with_read_lock<R>(
        &mut self,
        options: &AcquireOptions,
        f: impl FnOnce() -> R,
    ) -> Result<R> {
        let guard = self.read_lock(options)?;
        let value = f();
        guard.release()?;
        Ok(value)
    }

    /// Run `f` while holding the exclusive lock.
    pub fn with_write_lock<R>(
        &mut self,
        options: &AcquireOptions,
        f: impl FnOnce() -> R,
    ) -> Result<R> {
        let guard = self.write_lock(options)?;
        let value = f();
        guard.release()?;
        Ok(value)
    }

    fn held_mode(&self) -> Option<LockMode> {
        if self.read_handle.is_some() {
            Some(LockMode::Shared)
        } else if self.write_handle.is_some() {
            Some(LockMode::Exclusive)
        } else {
            None
        }
    }

    fn slot(&mut self, mode: LockMode) -> &mut Option<File> {
        match mode {
            LockMode::Shared => &mut self.read_handle,
            LockMode::Exclusive => &mut self.write_handle,
        }
    }

    fn scoped(
        &mut self,
        mode: LockMode,
        options: &AcquireOptions,
    ) -> Result<ProcessRwLockGuard<'_, B>> {
        if !self.acquire(mode, options)? {
            return Err(LockError::NotAcquired(self.path.clone()));
        }
        Ok(ProcessRwLockGuard::new(self, mode))
    }

    fn acquire(&mut self, mode: LockMode, options: &AcquireOptions) -> Result<bool> {
        // POSIX record locks belong to the process: releasing either mode
        // would silently drop the other, so one object holds one mode at a time.
        if let Some(held) = self.held_mode() {
            return Err(LockError::Usage(format!(
                "cannot take a {} lock on `{}`: a {} lock is already held through this object",
                mode.as_str(),
                self.path.display(),
                held.as_str()
            )));
        }

        let handle = acquire::open::<B>(&self.path)?;
        let result = acquire::acquire_on::<B>(
            &handle,
            Request {
                path: &self.path,
                mode,
                range: ByteRange::WHOLE_FILE,
                options,
                sleeper: &self.sleeper,
            },
        );

        if matches!(result, Ok(true)) {
            *self.slot(mode) = Some(handle);
        } else {
            acquire::discard::<B>(handle, &self.path);
        }
        result
    }

    pub(super) fn release(&mut self, mode: LockMode) -> Result<()> {
        match self.slot(mode).take() {
            Some(handle) => {
                acquire::release_handle::<B>(handle, &self.path, ByteRange::WHOLE_FILE)
            }
            None => Err(LockError::Usage(format!(
                "unable to release an unacquired {} lock",
                mode.as_str()
            ))),
        }
    }
}

impl<B: FileLockBackend> fmt::Debug for InterProcessReaderWriterLock<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterProcessReaderWriterLock")
            .field("path", &self.path)
            .field("read_held", &self.holds_read_lock())
            .field("write_held", &self.holds_write_lock())
            .finish_non_exhaustive()
    }
}
