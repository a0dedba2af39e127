//! Implementation of the `lockwright exec` command.

use super::FileLock;
use crate::cli::ExecArgs;
use lockwright::{LockError, Result, exit_codes};
use std::process::{Command, ExitStatus};

/// Run a command while holding the lock and pass its exit code through.
pub fn cmd_exec(args: ExecArgs) -> Result<u8> {
    let argv = command_line(&args)?;
    let options = args.wait.acquire_options()?;
    let mut lock = FileLock::new(&args.lock);

    lock.run(&options, || {
        let (program, rest) = argv
            .split_first()
            .ok_or_else(|| LockError::Command("no program given".to_string()))?;

        tracing::debug!(program = %program, args = ?rest, "spawning command");
        let status = Command::new(program)
            .args(rest)
            .status()
            .map_err(|e| LockError::Command(format!("failed to execute '{}': {}", program, e)))?;

        Ok(exit_code(status))
    })
}

/// The argv to run, from either `-c` or the arguments after `--`.
pub(crate) fn command_line(args: &ExecArgs) -> Result<Vec<String>> {
    let argv = match &args.command {
        Some(command) => shell_words::split(command).map_err(|e| {
            LockError::Command(format!("failed to parse command '{}': {}", command, e))
        })?,
        None => args.argv.clone(),
    };

    if argv.is_empty() {
        return Err(LockError::Command("command is empty".to_string()));
    }
    Ok(argv)
}

/// Exit code to report for a finished child.
///
/// A child killed by a signal reports `128 + signal`, as shells do.
pub(crate) fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code).unwrap_or(exit_codes::USER_ERROR as u8);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from(128 + signal).unwrap_or(u8::MAX);
        }
    }

    exit_codes::USER_ERROR as u8
}
