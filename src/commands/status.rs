//! Implementation of the `schedlock status` command.

use super::CommandContext;
use crate::cli::StatusArgs;
use chrono::{DateTime, Utc};
use schedlock::error::{Result, SchedLockError};
use schedlock::lease::format_lease;
use schedlock::store::LockRecord;
use serde::Serialize;

/// One lock as shown by `status --json`.
#[derive(Debug, Serialize)]
struct LockStatus<'a> {
    #[serde(flatten)]
    record: &'a LockRecord,
    held: bool,
    remaining_secs: Option<i64>,
}

/// Execute the `schedlock status` command.
pub fn cmd_status(ctx: &CommandContext, args: StatusArgs) -> Result<()> {
    print!("{}", status_report(ctx, &args)?);
    Ok(())
}

/// Read the requested rows and render them in the requested format.
fn status_report(ctx: &CommandContext, args: &StatusArgs) -> Result<String> {
    let store = ctx.open_store()?;
    let now = store.now();

    let records: Vec<LockRecord> = match &args.name {
        Some(name) => store.get(name)?.into_iter().collect(),
        None => store.list()?,
    };

    if args.json {
        Ok(format!("{}\n", render_json(&records, now)?))
    } else {
        Ok(render_table(&records, now))
    }
}

fn render_json(records: &[LockRecord], now: DateTime<Utc>) -> Result<String> {
    let rows: Vec<LockStatus<'_>> = records
        .iter()
        .map(|record| LockStatus {
            record,
            held: record.is_held(now),
            remaining_secs: record.remaining(now).map(|d| d.num_seconds()),
        })
        .collect();

    serde_json::to_string_pretty(&rows)
        .map_err(|e| SchedLockError::UserError(format!("failed to serialize status: {}", e)))
}

fn render_table(records: &[LockRecord], now: DateTime<Utc>) -> String {
    if records.is_empty() {
        return "No locks recorded.\n".to_string();
    }

    let mut out = format!("Locks ({}):\n\n", records.len());
    for record in records {
        out.push_str(&format!("  {}:\n", record.name));
        match record.remaining(now) {
            Some(remaining) => out.push_str(&format!(
                "    State:      HELD ({} left)\n",
                format_lease(remaining)
            )),
            None => out.push_str("    State:      EXPIRED\n"),
        }
        out.push_str(&format!(
            "    Until:      {}\n",
            record.locked_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&format!(
            "    Granted:    {}\n\n",
            record.locked_granted.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    out
}
