//! RAII guards for the cross-process locks.

use super::exclusive::InterProcessLock;
use super::shared::InterProcessReaderWriterLock;
use crate::backend::{FileLockBackend, LockMode};
use crate::error::Result;
use std::path::Path;

/// RAII guard for an [`InterProcessLock`].
///
/// When dropped, the lock is released. If releasing fails, a warning is
/// logged but no panic occurs.
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ProcessLockGuard<'a, B: FileLockBackend> {
    lock: &'a mut InterProcessLock<B>,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<'a, B: FileLockBackend> ProcessLockGuard<'a, B> {
    pub(super) fn new(lock: &'a mut InterProcessLock<B>) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        self.lock.path()
    }

    /// Manually release the lock, reporting any failure.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.release()
    }
}

impl<B: FileLockBackend> Drop for ProcessLockGuard<'_, B> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.lock.release()
        {
            tracing::warn!(
                path = %self.lock.path().display(),
                error = %e,
                "failed to release lock"
            );
        }
    }
}

/// RAII guard for one mode of an [`InterProcessReaderWriterLock`].
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ProcessRwLockGuard<'a, B: FileLockBackend> {
    lock: &'a mut InterProcessReaderWriterLock<B>,
    mode: LockMode,
    released: bool,
}

impl<'a, B: FileLockBackend> ProcessRwLockGuard<'a, B> {
    pub(super) fn new(lock: &'a mut InterProcessReaderWriterLock<B>, mode: LockMode) -> Self {
        Self {
            lock,
            mode,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        self.lock.path()
    }

    /// Whether this guard holds the shared or the exclusive lock.
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Manually release the lock, reporting any failure.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.release(self.mode)
    }
}

impl<B: FileLockBackend> Drop for ProcessRwLockGuard<'_, B> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.lock.release(self.mode)
        {
            tracing::warn!(
                path = %self.lock.path().display(),
                mode = self.mode.as_str(),
                error = %e,
                "failed to release lock"
            );
        }
    }
}
