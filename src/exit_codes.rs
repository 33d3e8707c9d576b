//! Exit code constants for the schedlock CLI.
//!
//! - 0: Success (including a run that was skipped because the lock is held)
//! - 1: User error (bad args, invalid state)
//! - 2: Configuration error (unreadable config, malformed lease)
//! - 3: Storage failure (database unreachable, lock table missing)
//! - 4: Lock held by another node
//!
//! A guarded `run` whose program fails exits with the program's own code.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid state.
pub const USER_ERROR: i32 = 1;

/// Configuration error: config file or lease duration could not be used.
pub const CONFIG_ERROR: i32 = 2;

/// Storage failure: the lock table could not be reached.
pub const STORAGE_FAILURE: i32 = 3;

/// Lock acquisition was not granted.
pub const LOCK_HELD: i32 = 4;
