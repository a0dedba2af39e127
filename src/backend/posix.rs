//! POSIX advisory record locks via `fcntl(F_SETLK)`.

use super::{ByteRange, FileLockBackend, LockMode};
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;

/// Record-lock backend for Unix-like systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixBackend;

impl FileLockBackend for PosixBackend {
    fn try_lock(handle: &File, mode: LockMode, range: ByteRange) -> io::Result<bool> {
        let lock_type = match mode {
            LockMode::Shared => libc::F_RDLCK,
            LockMode::Exclusive => libc::F_WRLCK,
        };
        match set_lock(handle, lock_type as libc::c_short, range) {
            Ok(()) => Ok(true),
            Err(e) if is_contention(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn unlock(handle: &File, range: ByteRange) -> io::Result<()> {
        set_lock(handle, libc::F_UNLCK as libc::c_short, range)
    }
}

/// EAGAIN and EACCES are both used for "held by someone else", depending on the system.
fn is_contention(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(code) if code == libc::EAGAIN || code == libc::EACCES)
}

fn set_lock(handle: &File, lock_type: libc::c_short, range: ByteRange) -> io::Result<()> {
    let start = libc::off_t::try_from(range.start)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "lock range start too large"))?;
    let len = libc::off_t::try_from(range.len)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "lock range length too large"))?;

    // SAFETY: `flock` is a plain C struct; all-zero is a valid value and the
    // fields that matter are set below.
    let mut request: libc::flock = unsafe { std::mem::zeroed() };
    request.l_type = lock_type;
    request.l_whence = libc::SEEK_SET as libc::c_short;
    request.l_start = start;
    request.l_len = len;

    // SAFETY: the descriptor is owned by `handle` and stays open for the
    // duration of the call; `request` outlives it.
    let result = unsafe {
        libc::fcntl(
            handle.as_raw_fd(),
            libc::F_SETLK,
            &request as *const libc::flock,
        )
    };
    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
