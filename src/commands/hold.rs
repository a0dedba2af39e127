//! Implementation of the `lockwright hold` command.

use super::FileLock;
use crate::cli::HoldArgs;
use lockwright::{LockError, Result, exit_codes};
use std::time::Duration;

/// Acquire the lock, announce it on stdout, and keep it for a while.
pub fn cmd_hold(args: HoldArgs) -> Result<u8> {
    let duration = Duration::try_from_secs_f64(args.seconds).map_err(|e| {
        LockError::InvalidArgument(format!("seconds must be a non-negative number: {}", e))
    })?;
    let options = args.wait.acquire_options()?;
    let mut lock = FileLock::new(&args.lock);

    lock.run(&options, || {
        // Stdout is line buffered, so watchers see this as soon as the lock is held.
        println!("acquired {}", args.lock.path.display());

        std::thread::sleep(duration);
        Ok(exit_codes::SUCCESS as u8)
    })
}
