//! Implementation of the `lockwright probe` command.

use super::FileLock;
use crate::cli::ProbeArgs;
use lockwright::{AcquireOptions, Result, exit_codes};
use std::path::PathBuf;

/// What a probe found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub path: PathBuf,
    pub mode: &'static str,
    pub held: bool,
}

impl ProbeReport {
    pub fn state(&self) -> &'static str {
        if self.held { "held" } else { "free" }
    }

    pub fn exit_code(&self) -> u8 {
        if self.held {
            exit_codes::LOCK_BUSY as u8
        } else {
            exit_codes::SUCCESS as u8
        }
    }
}

/// Try the lock once and report whether it is held elsewhere.
pub fn cmd_probe(args: ProbeArgs) -> Result<u8> {
    let report = probe(&args)?;

    if args.json {
        let json = serde_json::json!({
            "path": report.path.display().to_string(),
            "mode": report.mode,
            "state": report.state(),
        });
        println!("{}", json);
    } else {
        println!("{}", report.state());
    }

    Ok(report.exit_code())
}

pub(crate) fn probe(args: &ProbeArgs) -> Result<ProbeReport> {
    let mut lock = FileLock::new(&args.lock);
    let acquired = lock.acquire(&AcquireOptions::non_blocking())?;
    if acquired {
        lock.release()?;
    }

    Ok(ProbeReport {
        path: args.lock.path.clone(),
        mode: args.lock.mode().as_str(),
        held: !acquired,
    })
}
