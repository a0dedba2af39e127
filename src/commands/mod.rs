//! Command implementations for lockwright.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the lock plumbing they share.

mod exec;
mod hold;
mod probe;


use crate::cli::{Command, LockArgs, WaitArgs};
use lockwright::{
    AcquireOptions, InterProcessLock, InterProcessReaderWriterLock, LockError, LockMode, Result,
    Settings,
};
use std::path::Path;

/// Dispatch a command to its implementation.
///
/// Returns the process exit code on success.
pub fn dispatch(command: Command) -> Result<u8> {
    match command {
        Command::Exec(args) => exec::cmd_exec(args),
        Command::Probe(args) => probe::cmd_probe(args),
        Command::Hold(args) => hold::cmd_hold(args),
    }
}

impl WaitArgs {
    /// Merge the settings file (if any) with the command-line flags.
    pub fn acquire_options(&self) -> Result<AcquireOptions> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if self.no_wait {
            settings.blocking = false;
        }
        if let Some(delay) = self.delay {
            settings.delay_secs = delay;
        }
        if let Some(max_delay) = self.max_delay {
            settings.max_delay_secs = max_delay;
        }
        if self.timeout.is_some() {
            settings.timeout_secs = self.timeout;
        }

        settings.acquire_options()
    }
}

impl LockArgs {
    pub fn mode(&self) -> LockMode {
        if self.shared {
            LockMode::Shared
        } else {
            LockMode::Exclusive
        }
    }
}

/// The lock a command operates on.
///
/// Exclusive requests use the exclusive-only lock; shared requests need the
/// reader-writer one.
pub(crate) enum FileLock {
    Exclusive(InterProcessLock),
    Shared(InterProcessReaderWriterLock),
}

impl FileLock {
    pub(crate) fn new(args: &LockArgs) -> Self {
        match args.mode() {
            LockMode::Exclusive => FileLock::Exclusive(InterProcessLock::new(&args.path)),
            LockMode::Shared => FileLock::Shared(InterProcessReaderWriterLock::new(&args.path)),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        match self {
            FileLock::Exclusive(lock) => lock.path(),
            FileLock::Shared(lock) => lock.path(),
        }
    }

    pub(crate) fn acquire(&mut self, options: &AcquireOptions) -> Result<bool> {
        match self {
            FileLock::Exclusive(lock) => lock.acquire(options),
            FileLock::Shared(lock) => lock.acquire_read_lock(options),
        }
    }

    pub(crate) fn release(&mut self) -> Result<()> {
        match self {
            FileLock::Exclusive(lock) => lock.release(),
            FileLock::Shared(lock) => lock.release_read_lock(),
        }
    }

    /// Acquire, run `f`, and release.
    ///
    /// Fails with [`LockError::Busy`] when the lock was not obtained. If `f`
    /// fails the lock is still released, and `f`'s error wins.
    pub(crate) fn run<R>(
        &mut self,
        options: &AcquireOptions,
        f: impl FnOnce() -> Result<R>,
    ) -> Result<R> {
        if !self.acquire(options)? {
            return Err(LockError::Busy(self.path().to_path_buf()));
        }
        tracing::info!(path = %self.path().display(), "lock acquired");

        let result = f();
        let released = self.release();
        let value = result?;
        released?;
        Ok(value)
    }
}
