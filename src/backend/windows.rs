//! Windows range locks via `LockFileEx` / `UnlockFileEx`.

use super::{ByteRange, FileLockBackend, LockMode};
use std::fs::File;
use std::io;
use std::os::windows::io::AsRawHandle;
use windows_sys::Win32::Foundation::{ERROR_LOCK_VIOLATION, HANDLE};
use windows_sys::Win32::Storage::FileSystem::{
    LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY, LockFileEx, UnlockFileEx,
};
use windows_sys::Win32::System::IO::{OVERLAPPED, OVERLAPPED_0, OVERLAPPED_0_0};

/// Range-lock backend for Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsBackend;

impl FileLockBackend for WindowsBackend {
    fn try_lock(handle: &File, mode: LockMode, range: ByteRange) -> io::Result<bool> {
        let mut flags = LOCKFILE_FAIL_IMMEDIATELY;
        if mode.is_exclusive() {
            flags |= LOCKFILE_EXCLUSIVE_LOCK;
        }
        let (len_low, len_high) = split(region_len(range));
        let mut overlapped = overlapped_at(range.start);

        // SAFETY: the handle is owned by `handle` and outlives the call;
        // `overlapped` is a valid, initialized OVERLAPPED.
        let ok = unsafe {
            LockFileEx(
                handle.as_raw_handle() as HANDLE,
                flags,
                0,
                len_low,
                len_high,
                &mut overlapped,
            )
        };
        if ok != 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(ERROR_LOCK_VIOLATION as i32) {
            Ok(false)
        } else {
            Err(err)
        }
    }

    fn unlock(handle: &File, range: ByteRange) -> io::Result<()> {
        let (len_low, len_high) = split(region_len(range));
        let mut overlapped = overlapped_at(range.start);

        // SAFETY: as in `try_lock`.
        let ok = unsafe {
            UnlockFileEx(
                handle.as_raw_handle() as HANDLE,
                0,
                len_low,
                len_high,
                &mut overlapped,
            )
        };
        if ok != 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

/// Windows has no "to end of file" length; lock the largest possible region instead.
fn region_len(range: ByteRange) -> u64 {
    if range.len == 0 { u64::MAX } else { range.len }
}

fn split(value: u64) -> (u32, u32) {
    (value as u32, (value >> 32) as u32)
}

fn overlapped_at(offset: u64) -> OVERLAPPED {
    let (low, high) = split(offset);
    OVERLAPPED {
        Internal: 0,
        InternalHigh: 0,
        Anonymous: OVERLAPPED_0 {
            Anonymous: OVERLAPPED_0_0 {
                Offset: low,
                OffsetHigh: high,
            },
        },
        hEvent: std::ptr::null_mut(),
    }
}
