//! RAII guards for the in-process reader-writer lock.

use super::lock::ReaderWriterLock;
use std::marker::PhantomData;

/// Read access held by the current thread. Released on drop.
#[must_use = "read access is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ReadGuard<'a> {
    lock: &'a ReaderWriterLock,
    // Ownership is tracked per thread.
    _not_send: PhantomData<*const ()>,
}

impl<'a> ReadGuard<'a> {
    pub(super) fn new(lock: &'a ReaderWriterLock) -> Self {
        Self {
            lock,
            _not_send: PhantomData,
        }
    }
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.lock.release_read() {
            tracing::warn!(error = %e, "failed to release read lock");
        }
    }
}

/// Write access held by the current thread. Released on drop.
#[must_use = "write access is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct WriteGuard<'a> {
    lock: &'a ReaderWriterLock,
    _not_send: PhantomData<*const ()>,
}

impl<'a> WriteGuard<'a> {
    pub(super) fn new(lock: &'a ReaderWriterLock) -> Self {
        Self {
            lock,
            _not_send: PhantomData,
        }
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.lock.release_write() {
            tracing::warn!(error = %e, "failed to release write lock");
        }
    }
}
