//! Implementation of the `schedlock init` command.
//!
//! Creates the database file (if missing) and the `scheduler_lock` table.
//! Idempotent: existing rows are never touched.

use super::CommandContext;
use rusqlite::Connection;
use schedlock::error::{Result, SchedLockError};
use schedlock::store::create_table;
use tracing::info;

/// Execute the `schedlock init` command.
pub fn cmd_init(ctx: &CommandContext) -> Result<()> {
    if let Some(parent) = ctx.database.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            SchedLockError::UserError(format!(
                "failed to create database directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let conn = Connection::open(&ctx.database).map_err(|e| {
        SchedLockError::StorageError(format!(
            "failed to open lock database '{}': {}",
            ctx.database.display(),
            e
        ))
    })?;
    create_table(&conn)?;

    info!(database = %ctx.database.display(), "lock table ready");
    println!("Lock table ready: {}", ctx.database.display());
    Ok(())
}
