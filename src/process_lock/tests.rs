//! Tests for the cross-process locks.
//!
//! Contention between processes is covered by `tests/cross_process.rs`;
//! these tests use in-process backends to reach the busy and failing paths.

use super::*;
use crate::backend::ByteRange;
use crate::error::LockError;
use crate::test_support::{
    BROKEN_ERRNO, BrokenBackend, BusyBackend, GrantOnceBackend, RecordingSleeper, StuckBackend,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_acquire_release_file_lock() {
    let temp_dir = TempDir::new().unwrap();
    let lock_file = temp_dir.path().join("lock");
    let mut lock = InterProcessLock::new(&lock_file);

    assert!(!lock.exists());
    assert!(lock.acquire(&AcquireOptions::default()).unwrap());
    assert!(lock.is_acquired());
    assert!(lock.exists());

    lock.release().unwrap();
    assert!(!lock.is_acquired());
    // The lock file stays behind.
    assert!(lock.exists());
}

#[test]
fn test_bad_release() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessLock::new(temp_dir.path().join("lock"));

    let err = lock.release().unwrap_err();
    assert!(matches!(err, LockError::Usage(_)));
    assert!(err.to_string().contains("unacquired"));
}

#[test]
fn test_double_release_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessLock::new(temp_dir.path().join("lock"));

    assert!(lock.acquire(&AcquireOptions::non_blocking()).unwrap());
    lock.release().unwrap();
    assert!(matches!(lock.release(), Err(LockError::Usage(_))));
}

#[test]
fn test_bad_acquire() {
    let temp_dir = TempDir::new().unwrap();
    let sleeper = RecordingSleeper::default();
    let mut lock = InterProcessLock::<BrokenBackend>::with_backend(temp_dir.path().join("lock"))
        .with_sleeper(sleeper.sleeper());

    let err = lock.acquire(&AcquireOptions::default()).unwrap_err();

    match err {
        LockError::Os { source, .. } => assert_eq!(source.raw_os_error(), Some(BROKEN_ERRNO)),
        other => panic!("expected an OS error, got {:?}", other),
    }
    // Fatal errors are not retried.
    assert!(sleeper.calls().is_empty());
    assert!(!lock.is_acquired());
}

#[test]
fn test_non_blocking_contention_returns_false() {
    let temp_dir = TempDir::new().unwrap();
    let sleeper = RecordingSleeper::default();
    let mut lock = InterProcessLock::<BusyBackend>::with_backend(temp_dir.path().join("lock"))
        .with_sleeper(sleeper.sleeper());

    assert!(!lock.acquire(&AcquireOptions::non_blocking()).unwrap());
    assert!(!lock.is_acquired());
    assert!(sleeper.calls().is_empty());
}

#[test]
fn test_timeout_backs_off_linearly() {
    let temp_dir = TempDir::new().unwrap();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);
    let mut lock = InterProcessLock::<BusyBackend>::with_backend(temp_dir.path().join("lock"))
        .with_sleeper(Arc::new(move |wait: Duration| {
            recorded.lock().unwrap().push(wait);
            std::thread::sleep(wait);
        }));

    let options = AcquireOptions::new()
        .with_delay(ms(10))
        .with_max_delay(ms(20))
        .with_timeout(ms(60));
    let started = Instant::now();
    assert!(!lock.acquire(&options).unwrap());

    assert!(started.elapsed() >= ms(60));
    let calls = calls.lock().unwrap();
    assert!(calls.len() >= 3);
    assert_eq!(calls[0], ms(10));
    assert!(calls[1..].iter().all(|wait| *wait == ms(20)));
}

#[test]
fn test_zero_timeout_gives_up_after_first_attempt() {
    let temp_dir = TempDir::new().unwrap();
    let sleeper = RecordingSleeper::default();
    let mut lock = InterProcessLock::<BusyBackend>::with_backend(temp_dir.path().join("lock"))
        .with_sleeper(sleeper.sleeper());

    std::thread::sleep(ms(1));
    let options = AcquireOptions::new().with_timeout(Duration::ZERO);
    // The deadline is checked only after a failed attempt, so at most one
    // sleep can slip in before it is seen as expired.
    assert!(!lock.acquire(&options).unwrap());
    assert!(sleeper.calls().len() <= 1);
}

#[test]
fn test_scoped_lock_fails_when_not_acquired() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessLock::<BusyBackend>::with_backend(temp_dir.path().join("lock"));

    let err = lock.lock(&AcquireOptions::non_blocking()).unwrap_err();
    assert!(matches!(err, LockError::NotAcquired(_)));

    let mut ran = false;
    let err = lock
        .locked(&AcquireOptions::non_blocking(), || ran = true)
        .unwrap_err();
    assert!(matches!(err, LockError::NotAcquired(_)));
    assert!(!ran);
}

#[test]
fn test_lock_guard_releases_on_drop() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessLock::new(temp_dir.path().join("lock"));

    {
        let guard = lock.lock(&AcquireOptions::default()).unwrap();
        assert!(guard.path().ends_with("lock"));
    }
    assert!(!lock.is_acquired());

    let guard = lock.lock(&AcquireOptions::default()).unwrap();
    guard.release().unwrap();
    assert!(!lock.is_acquired());
}

#[test]
fn test_lock_file_exists() {
    let temp_dir = TempDir::new().unwrap();
    let lock_file = temp_dir.path().join("lock");

    let seen = interprocess_locked(&lock_file, &AcquireOptions::default(), || {
        lock_file.exists()
    })
    .unwrap();

    assert!(seen);
}

#[test]
fn test_nested_synchronized_external_works() {
    let temp_dir = TempDir::new().unwrap();
    let options = AcquireOptions::default();
    let outer = temp_dir.path().join("test-lock-1");
    let inner = temp_dir.path().join("test-lock-2");

    let sentinel = interprocess_locked(&outer, &options, || {
        interprocess_locked(&inner, &options, || "sentinel")
    })
    .unwrap()
    .unwrap();

    assert_eq!(sentinel, "sentinel");
}

#[test]
fn test_panic_in_locked_body_releases() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessLock::new(temp_dir.path().join("lock"));

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        lock.locked(&AcquireOptions::default(), || {
            panic!("Broken");
        })
    }));

    assert!(result.is_err());
    assert!(!lock.is_acquired());
    assert!(lock.acquire(&AcquireOptions::non_blocking()).unwrap());
    lock.release().unwrap();
}

#[test]
fn test_non_destructive() {
    let temp_dir = TempDir::new().unwrap();
    let lock_file = temp_dir.path().join("not-destroyed");
    std::fs::write(&lock_file, "test").unwrap();

    let content = interprocess_locked(&lock_file, &AcquireOptions::default(), || {
        std::fs::read_to_string(&lock_file).unwrap()
    })
    .unwrap();

    assert_eq!(content, "test");
    assert_eq!(std::fs::read_to_string(&lock_file).unwrap(), "test");
}

#[test]
fn test_lock_dir_not_exist() {
    let temp_dir = TempDir::new().unwrap();
    let lock_file = temp_dir.path().join("missing").join("nested").join("lock");

    let mut lock = InterProcessLock::new(&lock_file);
    assert!(lock.acquire(&AcquireOptions::default()).unwrap());
    lock.release().unwrap();

    // Parent now exists; acquiring again must not trip over it.
    let mut again = InterProcessLock::new(&lock_file);
    assert!(again.acquire(&AcquireOptions::default()).unwrap());
    again.release().unwrap();
}

#[test]
fn test_lock_range() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock =
        InterProcessLock::new(temp_dir.path().join("lock")).with_range(ByteRange::new(0, 1));

    assert_eq!(lock.range(), ByteRange::new(0, 1));
    assert!(lock.acquire(&AcquireOptions::non_blocking()).unwrap());
    lock.release().unwrap();
}

#[test]
fn test_reacquire_refused_keeps_existing_hold() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock =
        InterProcessLock::<GrantOnceBackend>::with_backend(temp_dir.path().join("lock"));

    assert!(lock.acquire(&AcquireOptions::non_blocking()).unwrap());
    assert!(!lock.acquire(&AcquireOptions::non_blocking()).unwrap());

    // The refused retry does not give up the lock already held.
    assert!(lock.is_acquired());
    lock.release().unwrap();
    assert!(!lock.is_acquired());
}

#[test]
fn test_unlock_failure_still_closes_handle() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessLock::<StuckBackend>::with_backend(temp_dir.path().join("lock"));

    assert!(lock.acquire(&AcquireOptions::default()).unwrap());
    let err = lock.release().unwrap_err();

    assert!(matches!(err, LockError::Os { .. }));
    assert!(!lock.is_acquired());
}

#[test]
fn test_unlock_failure_is_reported_by_locked() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessLock::<StuckBackend>::with_backend(temp_dir.path().join("lock"));

    let result = lock.locked(&AcquireOptions::default(), || 42);

    assert!(matches!(result, Err(LockError::Os { .. })));
}

#[test]
fn test_open_failure_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let mut lock = InterProcessLock::new(blocker.join("lock"));

    let err = lock.acquire(&AcquireOptions::default()).unwrap_err();
    assert!(matches!(err, LockError::Os { .. }));
    assert!(err.to_string().contains("blocker"));
    // Open failures are not reported as failed lock calls.
    assert!(err.to_string().starts_with("lock file operation on"));
}

#[test]
fn test_options_from_secs() {
    let options = AcquireOptions::from_secs(0.01, 0.1, Some(2.5)).unwrap();
    assert_eq!(options.delay, ms(10));
    assert_eq!(options.max_delay, ms(100));
    assert_eq!(options.timeout, Some(ms(2500)));
    assert!(options.blocking);

    let options = AcquireOptions::from_secs(0.0, 0.0, None).unwrap();
    assert_eq!(options.timeout, None);
}

#[test]
fn test_options_reject_negative_values() {
    let err = AcquireOptions::from_secs(-1.0, 0.1, None).unwrap_err();
    assert!(matches!(err, LockError::InvalidArgument(_)));
    assert!(err.to_string().contains("delay"));

    let err = AcquireOptions::from_secs(0.01, 0.1, Some(-0.5)).unwrap_err();
    assert!(matches!(err, LockError::InvalidArgument(_)));
    assert!(err.to_string().contains("timeout"));

    assert!(AcquireOptions::from_secs(f64::NAN, 0.1, None).is_err());
    assert!(AcquireOptions::from_secs(0.01, f64::INFINITY, None).is_err());
}

#[test]
fn test_options_builders() {
    let options = AcquireOptions::non_blocking();
    assert!(!options.blocking);
    assert_eq!(options.delay, DEFAULT_DELAY);
    assert_eq!(options.max_delay, DEFAULT_MAX_DELAY);

    let options = options.with_blocking(true).with_timeout(ms(5)).without_timeout();
    assert!(options.blocking);
    assert_eq!(options.timeout, None);
}

#[test]
fn test_rw_read_then_write() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessReaderWriterLock::new(temp_dir.path().join("rw.lock"));
    let options = AcquireOptions::default();

    assert!(lock.acquire_read_lock(&options).unwrap());
    assert!(lock.holds_read_lock());
    lock.release_read_lock().unwrap();
    assert!(!lock.holds_read_lock());

    assert!(lock.acquire_write_lock(&options).unwrap());
    assert!(lock.holds_write_lock());
    lock.release_write_lock().unwrap();
    assert!(!lock.holds_write_lock());
}

#[test]
fn test_rw_release_without_acquire() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessReaderWriterLock::new(temp_dir.path().join("rw.lock"));

    assert!(matches!(lock.release_read_lock(), Err(LockError::Usage(_))));
    assert!(matches!(lock.release_write_lock(), Err(LockError::Usage(_))));
}

#[test]
fn test_rw_same_mode_twice_is_a_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessReaderWriterLock::new(temp_dir.path().join("rw.lock"));
    let options = AcquireOptions::non_blocking();

    assert!(lock.acquire_read_lock(&options).unwrap());
    assert!(matches!(
        lock.acquire_read_lock(&options),
        Err(LockError::Usage(_))
    ));
    // The original hold is untouched.
    assert!(lock.holds_read_lock());
    lock.release_read_lock().unwrap();
}

#[test]
fn test_rw_one_mode_per_object() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessReaderWriterLock::new(temp_dir.path().join("rw.lock"));
    let options = AcquireOptions::non_blocking();

    assert!(lock.acquire_read_lock(&options).unwrap());
    let err = lock.acquire_write_lock(&options).unwrap_err();
    assert!(matches!(err, LockError::Usage(_)));
    assert!(err.to_string().contains("shared lock is already held"));
    assert!(lock.holds_read_lock());
    assert!(!lock.holds_write_lock());
    lock.release_read_lock().unwrap();

    assert!(lock.acquire_write_lock(&options).unwrap());
    assert!(matches!(
        lock.acquire_read_lock(&options),
        Err(LockError::Usage(_))
    ));
    assert!(lock.holds_write_lock());
    assert!(!lock.holds_read_lock());
    lock.release_write_lock().unwrap();
}

#[test]
fn test_rw_busy_backend() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock =
        InterProcessReaderWriterLock::<BusyBackend>::with_backend(temp_dir.path().join("rw.lock"));
    let options = AcquireOptions::non_blocking();

    assert!(!lock.acquire_read_lock(&options).unwrap());
    assert!(!lock.acquire_write_lock(&options).unwrap());
    assert!(!lock.holds_read_lock());
    assert!(!lock.holds_write_lock());
    assert!(matches!(
        lock.read_lock(&options),
        Err(LockError::NotAcquired(_))
    ));
}

#[test]
fn test_rw_guards_and_closures() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessReaderWriterLock::new(temp_dir.path().join("dir").join("rw.lock"));
    let options = AcquireOptions::default();

    {
        let guard = lock.write_lock(&options).unwrap();
        assert_eq!(guard.mode(), crate::backend::LockMode::Exclusive);
    }
    assert!(!lock.holds_write_lock());

    let value = lock.with_read_lock(&options, || 7).unwrap();
    assert_eq!(value, 7);
    assert!(!lock.holds_read_lock());

    let value = lock.with_write_lock(&options, || "w").unwrap();
    assert_eq!(value, "w");
    assert!(!lock.holds_write_lock());
}

#[test]
fn test_rw_panic_releases() {
    let temp_dir = TempDir::new().unwrap();
    let mut lock = InterProcessReaderWriterLock::new(temp_dir.path().join("rw.lock"));

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        lock.with_write_lock(&AcquireOptions::default(), || {
            panic!("Broken");
        })
    }));

    assert!(result.is_err());
    assert!(!lock.holds_write_lock());
}
