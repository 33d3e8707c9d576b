//! Lock table layout and the SQL issued against it.

use crate::error::Result;
use rusqlite::Connection;

/// Name of the lock table.
pub const TABLE_NAME: &str = "scheduler_lock";

/// DDL for the lock table. `locked_at` is the lease expiry, not the grant time.
pub const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS scheduler_lock (
    name            TEXT PRIMARY KEY,
    locked_at       TIMESTAMP NOT NULL,
    locked_granted  TIMESTAMP NOT NULL
)";

pub(crate) const PROBE_NAME: &str = "InitializeQuery";

pub(crate) const GET_BY_NAME_QUERY: &str =
    "SELECT name, locked_at, locked_granted FROM scheduler_lock WHERE name = ?1";

pub(crate) const LIST_QUERY: &str =
    "SELECT name, locked_at, locked_granted FROM scheduler_lock ORDER BY name";

pub(crate) const HELD_QUERY: &str =
    "SELECT EXISTS(SELECT name FROM scheduler_lock WHERE name = ?1 AND locked_at > ?2)";

pub(crate) const EXISTS_BY_NAME_QUERY: &str =
    "SELECT EXISTS(SELECT name FROM scheduler_lock WHERE name = ?1)";

pub(crate) const INSERT_QUERY: &str =
    "INSERT INTO scheduler_lock (name, locked_at, locked_granted) VALUES (?1, ?2, ?3)";

pub(crate) const UPDATE_QUERY: &str =
    "UPDATE scheduler_lock SET locked_at = ?1, locked_granted = ?2 WHERE name = ?3";

/// Create the lock table if it does not exist yet.
///
/// The store itself never creates the table; this is for provisioning
/// (`schedlock init`) and tests.
pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE)?;
    Ok(())
}
