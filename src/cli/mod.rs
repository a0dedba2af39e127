//! CLI argument parsing for lockwright.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

mod setup;

pub use setup::init_tracing;

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Lockwright: advisory file locks for shell scripts and processes.
///
/// Locks are tied to an open file handle. When the holding process exits,
/// for any reason, the OS releases the lock.
#[derive(Parser, Debug)]
#[command(name = "lockwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for lockwright.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command while holding a lock.
    ///
    /// Exits with the command's exit code, or 3 if the lock was not obtained.
    Exec(ExecArgs),

    /// Check whether a lock is currently held.
    ///
    /// Makes a single non-blocking attempt. Prints `free` (exit 0) or
    /// `held` (exit 3).
    Probe(ProbeArgs),

    /// Acquire a lock and hold it for a while.
    ///
    /// Prints `acquired <PATH>` once the lock is held.
    Hold(HoldArgs),
}

/// Which lock to take.
#[derive(Args, Debug, Clone)]
pub struct LockArgs {
    /// Path of the lock file (created, with its parent directories, if missing).
    pub path: PathBuf,

    /// Take a shared (read) lock instead of an exclusive one.
    #[arg(long)]
    pub shared: bool,
}

/// How long to wait for the lock.
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Fail immediately if the lock is held elsewhere.
    #[arg(long)]
    pub no_wait: bool,

    /// Give up after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Base delay between attempts, in seconds.
    #[arg(long, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Upper bound on the delay between attempts, in seconds.
    #[arg(long, value_name = "SECS")]
    pub max_delay: Option<f64>,

    /// YAML settings file; flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `exec` command.
#[derive(Args, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    #[command(flatten)]
    pub wait: WaitArgs,

    /// Command string to run, split like a POSIX shell would (no shell is spawned).
    #[arg(
        short = 'c',
        long = "command",
        value_name = "COMMAND",
        conflicts_with = "argv",
        required_unless_present = "argv"
    )]
    pub command: Option<String>,

    /// Program and arguments to run, after `--`.
    #[arg(last = true, value_name = "PROGRAM")]
    pub argv: Vec<String>,
}

/// Arguments for the `probe` command.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    /// Print a JSON report instead of `free`/`held`.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `hold` command.
#[derive(Args, Debug)]
pub struct HoldArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    #[command(flatten)]
    pub wait: WaitArgs,

    /// How long to hold the lock, in seconds.
    #[arg(long, default_value_t = 60.0, value_name = "SECS")]
    pub seconds: f64,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
