//! Admission and release rules of the in-process reader-writer lock.

use super::guard::{ReadGuard, WriteGuard};
use super::state::{LockState, Owner};
use crate::error::{LockError, Result};
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// A reentrant, write-preferring reader-writer lock for threads.
///
/// # Example
///
/// ```
/// use lockwright::{Owner, ReaderWriterLock};
///
/// let lock = ReaderWriterLock::new();
/// {
///     let _write = lock.write_lock()?;
///     let _nested = lock.read_lock();
///     assert_eq!(lock.owner(), Some(Owner::Writer));
/// }
/// assert_eq!(lock.owner(), None);
/// # Ok::<(), lockwright::LockError>(())
/// ```
#[derive(Default)]
pub struct ReaderWriterLock {
    state: Mutex<LockState>,
    readers_cv: Condvar,
    writers_cv: Condvar,
}

impl ReaderWriterLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The admission rules never panic while holding the mutex, so a
    /// poisoned state is still consistent.
    fn state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take read access, blocking while a writer holds or waits for the lock.
    ///
    /// Granted immediately if the calling thread already reads or writes.
    pub fn acquire_read(&self) {
        let me = thread::current().id();
        let mut state = self.state();
        if state.writer == Some(me) || state.readers.contains_key(&me) {
            *state.readers.entry(me).or_insert(0) += 1;
            return;
        }
        while state.blocks_new_readers() {
            state = self
                .readers_cv
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.readers.insert(me, 1);
    }

    /// Drop one level of the calling thread's read access.
    pub fn release_read(&self) -> Result<()> {
        let me = thread::current().id();
        let mut state = self.state();
        let Some(depth) = state.readers.get_mut(&me) else {
            return Err(LockError::Usage(
                "unable to release a read lock not held by this thread".to_string(),
            ));
        };
        *depth -= 1;
        if *depth == 0 {
            state.readers.remove(&me);
            if state.readers.is_empty() {
                self.writers_cv.notify_all();
            }
        }
        Ok(())
    }

    /// Take write access, blocking until no other thread reads or writes.
    ///
    /// Fails without blocking if the calling thread holds only read access.
    pub fn acquire_write(&self) -> Result<()> {
        let me = thread::current().id();
        let mut state = self.state();
        if state.writer == Some(me) {
            state.writer_depth += 1;
            return Ok(());
        }
        if state.readers.contains_key(&me) {
            return Err(LockError::Reentrancy(
                "unable to acquire a write lock while holding a read lock".to_string(),
            ));
        }
        state.pending_writers += 1;
        while state.blocks_writers() {
            state = self
                .writers_cv
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.pending_writers -= 1;
        state.writer = Some(me);
        state.writer_depth = 1;
        Ok(())
    }

    /// Drop one level of the calling thread's write access.
    pub fn release_write(&self) -> Result<()> {
        let me = thread::current().id();
        let mut state = self.state();
        if state.writer != Some(me) {
            return Err(LockError::Usage(
                "unable to release a write lock not held by this thread".to_string(),
            ));
        }
        state.writer_depth -= 1;
        if state.writer_depth == 0 {
            state.writer = None;
            state.readers.remove(&me);
            if state.pending_writers > 0 {
                self.writers_cv.notify_all();
            }
            self.readers_cv.notify_all();
        }
        Ok(())
    }

    /// Scoped read access; released when the guard drops.
    pub fn read_lock(&self) -> ReadGuard<'_> {
        self.acquire_read();
        ReadGuard::new(self)
    }

    /// Scoped write access; released when the guard drops.
    pub fn write_lock(&self) -> Result<WriteGuard<'_>> {
        self.acquire_write()?;
        Ok(WriteGuard::new(self))
    }

    /// Run `f` with read access held.
    pub fn with_read<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.read_lock();
        f()
    }

    /// Run `f` with write access held.
    pub fn with_write<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
        let _guard = self.write_lock()?;
        Ok(f())
    }

    /// The kind of access currently holding the lock, across all threads.
    pub fn owner(&self) -> Option<Owner> {
        self.state().owner()
    }

    /// Whether the calling thread holds read access.
    pub fn is_reader(&self) -> bool {
        self.state().readers.contains_key(&current())
    }

    /// Whether the calling thread holds write access.
    pub fn is_writer(&self) -> bool {
        self.state().writer == Some(current())
    }

    /// Whether any thread is blocked waiting for write access.
    pub fn has_pending_writers(&self) -> bool {
        self.state().pending_writers > 0
    }

    /// Whether nobody holds or waits for the lock.
    pub fn is_idle(&self) -> bool {
        self.state().is_idle()
    }
}

fn current() -> ThreadId {
    thread::current().id()
}

impl fmt::Debug for ReaderWriterLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("ReaderWriterLock")
            .field("owner", &state.owner())
            .field("readers", &state.readers.len())
            .field("pending_writers", &state.pending_writers)
            .finish()
    }
}
