//! The retry loop behind every cross-process acquire.

use super::options::AcquireOptions;
use crate::backend::{ByteRange, FileLockBackend, LockMode};
use crate::error::{LockError, Result};
use crate::retry::{Attempt, RetryPolicy, Sleeper};
use crate::timing::StopWatch;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// One lock request against an already open handle.
pub(super) struct Request<'a> {
    pub(super) path: &'a Path,
    pub(super) mode: LockMode,
    pub(super) range: ByteRange,
    pub(super) options: &'a AcquireOptions,
    pub(super) sleeper: &'a Sleeper,
}

/// Try to lock `handle` until it succeeds, the caller gives up, or the OS
/// reports something other than contention.
///
/// Contention is `Ok(false)`; only non-contention failures are errors, and
/// those are never retried.
pub(super) fn acquire_on<B: FileLockBackend>(handle: &File, request: Request<'_>) -> Result<bool> {
    let Request {
        path,
        mode,
        range,
        options,
        sleeper,
    } = request;

    let mut watch = StopWatch::start(options.timeout);
    let policy =
        RetryPolicy::new(options.delay, options.max_delay).with_sleeper(Arc::clone(sleeper));

    let outcome = policy.run(|_| match B::try_lock(handle, mode, range) {
        Ok(true) => Ok(Attempt::Done(true)),
        Ok(false) if !options.blocking || watch.expired() => Ok(Attempt::Done(false)),
        Ok(false) => Ok(Attempt::Retry),
        Err(e) => Err(LockError::os(path, e)),
    })?;
    watch.stop();

    if outcome.value {
        tracing::debug!(
            path = %path.display(),
            mode = mode.as_str(),
            waited_ms = watch.elapsed().as_millis() as u64,
            attempts = outcome.attempts,
            "acquired file lock"
        );
    } else {
        tracing::debug!(
            path = %path.display(),
            mode = mode.as_str(),
            attempts = outcome.attempts,
            "file lock not acquired"
        );
    }
    Ok(outcome.value)
}

/// Unlock and close a handle.
///
/// The handle is closed even when unlocking fails, since closing releases
/// the lock anyway; the unlock error is still returned.
pub(super) fn release_handle<B: FileLockBackend>(
    handle: File,
    path: &Path,
    range: ByteRange,
) -> Result<()> {
    let unlocked = B::unlock(&handle, range);
    if let Err(e) = &unlocked {
        tracing::error!(path = %path.display(), error = %e, "could not unlock the acquired lock");
    }
    if let Err(e) = B::close_handle(handle) {
        tracing::error!(path = %path.display(), error = %e, "could not close the lock file handle");
    }
    unlocked.map_err(|e| LockError::os(path, e))?;
    tracing::debug!(path = %path.display(), "unlocked and closed file lock");
    Ok(())
}

/// Open the lock file for `path`, mapping failures to `LockError::Os`.
pub(super) fn open<B: FileLockBackend>(path: &Path) -> Result<File> {
    B::open_handle(path).map_err(|e| LockError::os(path, e))
}

/// Close a handle that never obtained a lock.
pub(super) fn discard<B: FileLockBackend>(handle: File, path: &Path) {
    if let Err(e) = B::close_handle(handle) {
        tracing::warn!(path = %path.display(), error = %e, "could not close the lock file handle");
    }
}
