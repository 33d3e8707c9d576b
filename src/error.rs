//! Error types for schedlock.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Note that a lock that is simply not granted is *not* an error inside the
//! library: `LockStore::acquire` reports it as `false`. `LockHeld` exists for
//! the CLI, where "not granted" must become an exit code.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for schedlock operations.
#[derive(Error, Debug)]
pub enum SchedLockError {
    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// Configuration could not be loaded, or a lease duration is malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The backing store is unreachable or the lock table is missing.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Lock is held by another node.
    #[error("Lock not acquired: {0}")]
    LockHeld(String),

    /// The guarded program ran and exited unsuccessfully.
    #[error("Job exited with code {code}")]
    JobFailed { code: i32 },
}

impl SchedLockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SchedLockError::UserError(_) => exit_codes::USER_ERROR,
            SchedLockError::ConfigError(_) => exit_codes::CONFIG_ERROR,
            SchedLockError::StorageError(_) => exit_codes::STORAGE_FAILURE,
            SchedLockError::LockHeld(_) => exit_codes::LOCK_HELD,
            SchedLockError::JobFailed { code } => *code,
        }
    }
}

impl From<rusqlite::Error> for SchedLockError {
    fn from(err: rusqlite::Error) -> Self {
        SchedLockError::StorageError(err.to_string())
    }
}

/// Result type alias for schedlock operations.
pub type Result<T> = std::result::Result<T, SchedLockError>;
