use crate::backend::{ByteRange, FileLockBackend, LockMode};
use crate::retry::Sleeper;
use std::fs::File;
use std::io;
use std::cell::Cell;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A sleeper that records requested delays instead of sleeping.
#[derive(Clone, Default)]
pub(crate) struct RecordingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub(crate) fn sleeper(&self) -> Sleeper {
        let calls = Arc::clone(&self.calls);
        Arc::new(move |wait| {
            calls
                .lock()
                .unwrap_or_else(|poison| poison.into_inner())
                .push(wait);
        })
    }

    pub(crate) fn calls(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

/// A backend whose lock is always held by "someone else".
#[derive(Debug)]
pub(crate) struct BusyBackend;

impl FileLockBackend for BusyBackend {
    fn try_lock(_handle: &File, _mode: LockMode, _range: ByteRange) -> io::Result<bool> {
        Ok(false)
    }

    fn unlock(_handle: &File, _range: ByteRange) -> io::Result<()> {
        Ok(())
    }
}

/// A backend whose locking call fails with EBUSY, which is not contention.
#[derive(Debug)]
pub(crate) struct BrokenBackend;

pub(crate) const BROKEN_ERRNO: i32 = 16;

impl FileLockBackend for BrokenBackend {
    fn try_lock(_handle: &File, _mode: LockMode, _range: ByteRange) -> io::Result<bool> {
        Err(io::Error::from_raw_os_error(BROKEN_ERRNO))
    }

    fn unlock(_handle: &File, _range: ByteRange) -> io::Result<()> {
        Ok(())
    }
}

/// A backend that locks fine but cannot unlock.
#[derive(Debug)]
pub(crate) struct StuckBackend;

impl FileLockBackend for StuckBackend {
    fn try_lock(_handle: &File, _mode: LockMode, _range: ByteRange) -> io::Result<bool> {
        Ok(true)
    }

    fn unlock(_handle: &File, _range: ByteRange) -> io::Result<()> {
        Err(io::Error::other("unlock refused"))
    }
}

thread_local! {
    static GRANTED: Cell<bool> = const { Cell::new(false) };
}

/// A backend that grants the first lock taken on the current thread and
/// reports contention afterwards, as Windows does when a handle that already
/// holds the lock asks for it again.
#[derive(Debug)]
pub(crate) struct GrantOnceBackend;

impl FileLockBackend for GrantOnceBackend {
    fn try_lock(_handle: &File, _mode: LockMode, _range: ByteRange) -> io::Result<bool> {
        Ok(!GRANTED.with(|granted| granted.replace(true)))
    }

    fn unlock(_handle: &File, _range: ByteRange) -> io::Result<()> {
        Ok(())
    }
}
