//! Implementation of the `schedlock acquire` command.

use super::CommandContext;
use crate::cli::AcquireArgs;
use schedlock::client::{JobLock, LockClient, Outcome};
use schedlock::error::{Result, SchedLockError};
use schedlock::store::LockRecord;
use tracing::warn;

/// Execute the `schedlock acquire` command.
///
/// Resolves the lease, then makes exactly one acquisition attempt.
pub fn cmd_acquire(ctx: &CommandContext, args: AcquireArgs) -> Result<()> {
    let job = JobLock::from_config(args.name, &args.lease, &ctx.config)?;
    let client = LockClient::new(ctx.open_store()?);
    let store = client.store();

    if let Outcome::Skipped = client.run_guarded(&job, || ()) {
        let detail = match store.get(job.name()) {
            Ok(Some(record)) if record.is_held(store.now()) => format!(
                "'{}' is held until {}",
                job.name(),
                record.locked_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            _ => format!("'{}' could not be acquired", job.name()),
        };
        return Err(SchedLockError::LockHeld(detail));
    }

    // The lease is ours from here on; a failed read only loses the expiry.
    println!("{}", granted_message(&job, store.get(job.name())));
    Ok(())
}

fn granted_message(job: &JobLock, record: Result<Option<LockRecord>>) -> String {
    match record {
        Ok(Some(record)) => format!(
            "Acquired {} until {}",
            job,
            record.locked_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        Ok(None) => format!("Acquired {}", job),
        Err(e) => {
            warn!(lock = job.name(), error = %e, "lock granted but its row could not be read");
            format!("Acquired {}", job)
        }
    }
}
