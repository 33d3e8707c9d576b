//! Implementation of the `schedlock run` command.
//!
//! The guarded call for shell schedulers: take the lease, then run the
//! program in the foreground with inherited stdio. When the lease is held
//! elsewhere the program is not started and the command succeeds, so a
//! crontab line on every node stays quiet on the nodes that lose.

use super::CommandContext;
use crate::cli::RunArgs;
use schedlock::client::{JobLock, LockClient, Outcome};
use schedlock::error::{Result, SchedLockError};
use std::process::{Command, ExitStatus};
use tracing::info;

/// Execute the `schedlock run` command.
pub fn cmd_run(ctx: &CommandContext, args: RunArgs) -> Result<()> {
    let job = JobLock::from_config(args.name, &args.lease, &ctx.config)?;
    let client = LockClient::new(ctx.open_store()?);

    match client.run_guarded(&job, || run_program(&args.program)) {
        Outcome::Skipped => {
            println!("Skipped {}: lock is held by another node.", job.name());
            Ok(())
        }
        Outcome::Ran(status) => {
            let status = status?;
            info!(lock = job.name(), code = ?status.code(), "guarded job finished");
            if status.success() {
                Ok(())
            } else {
                Err(SchedLockError::JobFailed {
                    code: status.code().unwrap_or(1),
                })
            }
        }
    }
}

/// Run `program[0]` with the remaining arguments and wait for it.
fn run_program(program: &[String]) -> Result<ExitStatus> {
    let (name, rest) = program
        .split_first()
        .ok_or_else(|| SchedLockError::UserError("no program given after `--`".to_string()))?;

    Command::new(name).args(rest).status().map_err(|e| {
        SchedLockError::UserError(format!(
            "failed to execute '{}': {}\n\
             Fix: ensure the command is installed and in PATH.",
            name, e
        ))
    })
}
