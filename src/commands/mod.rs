//! Command implementations for schedlock.
//!
//! This module resolves the effective configuration for an invocation and
//! routes CLI commands to their handlers.

mod acquire;
mod init;
mod run;
mod status;

use crate::cli::{Command, GlobalArgs};
use schedlock::config::Config;
use schedlock::error::{Result, SchedLockError};
use schedlock::store::LockStore;
use std::path::PathBuf;

/// Everything a command needs to reach the lock table.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    pub database: PathBuf,
}

impl CommandContext {
    /// Resolve config and database path from the global flags.
    ///
    /// Precedence for the database: `--database`, then `SCHEDLOCK_DATABASE`,
    /// then config `database`.
    pub fn resolve(global: &GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            SchedLockError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        let mut config = Config::discover(global.config.as_deref(), &cwd)?;
        if let Some(database) = &global.database {
            config.database = database.to_string_lossy().to_string();
        }

        let database = PathBuf::from(&config.database);
        Ok(Self { config, database })
    }

    /// Open the lock store, failing if the table is not provisioned.
    pub fn open_store(&self) -> Result<LockStore> {
        LockStore::open(&self.database, &self.config).map_err(|e| match e {
            SchedLockError::StorageError(msg) => SchedLockError::StorageError(format!(
                "{}\nFix: run `schedlock init` to create the lock table.",
                msg
            )),
            other => other,
        })
    }
}

/// Dispatch a command to its implementation.
pub fn dispatch(ctx: &CommandContext, command: Command) -> Result<()> {
    match command {
        Command::Init => init::cmd_init(ctx),
        Command::Acquire(args) => acquire::cmd_acquire(ctx, args),
        Command::Run(args) => run::cmd_run(ctx, args),
        Command::Status(args) => status::cmd_status(ctx, args),
    }
}
