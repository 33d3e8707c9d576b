//! Lock Store: the persistent lock table and the acquire algorithm.
//!
//! # Table
//!
//! One row per lock name in `scheduler_lock`. `locked_at` holds the lease
//! expiry; a lock is held while `locked_at > now`. Rows are inserted on the
//! first grant, updated on every later grant, and never deleted.
//!
//! # Acquisition
//!
//! [`LockStore::acquire`] runs a read-check-write sequence inside one
//! transaction under the connection's strictest isolation:
//!
//! 1. a live lease exists: not granted, nothing written
//! 2. an expired row exists: update expiry and grant time
//! 3. no row: insert one
//!
//! Only a write that touched exactly one row is a grant. Any storage failure
//! rolls the transaction back and reports "not granted"; it is never
//! surfaced as an error.
//! The connection's auto-commit and isolation settings are restored on every
//! exit path.
//!
//! # Validation
//!
//! Constructing a store probes the table. A missing table or unreachable
//! database fails construction, so a `LockStore` always points at a usable
//! table.

mod operations;
mod record;
pub mod schema;
mod session;

#[cfg(test)]
mod tests;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Result, SchedLockError};
use crate::logging::node_identity;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub use record::LockRecord;
pub use schema::create_table;

/// The acquire operation, as seen by callers that guard work with a lease.
///
/// [`LockStore`] is the production implementation; the seam lets the
/// client be exercised against other stores.
pub trait LeaseStore {
    /// Try to take lock `name` until `expires_at`. `true` only if granted.
    fn acquire(&self, name: &str, expires_at: DateTime<Utc>) -> bool;

    /// The instant the store considers "now".
    fn now(&self) -> DateTime<Utc>;
}

impl<S: LeaseStore + ?Sized> LeaseStore for &S {
    fn acquire(&self, name: &str, expires_at: DateTime<Utc>) -> bool {
        (**self).acquire(name, expires_at)
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<S: LeaseStore + ?Sized> LeaseStore for Arc<S> {
    fn acquire(&self, name: &str, expires_at: DateTime<Utc>) -> bool {
        (**self).acquire(name, expires_at)
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Lease store over a SQLite `scheduler_lock` table.
pub struct LockStore {
    /// Connection used exclusively by one acquisition at a time.
    conn: Mutex<Connection>,

    clock: Arc<dyn Clock>,

    /// `user@host`, attached to log events.
    node: String,
}

impl std::fmt::Debug for LockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockStore")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl LockStore {
    /// Open an existing database and validate the lock table.
    ///
    /// The database file is never created here; run `schedlock init` (or
    /// [`create_table`]) first.
    ///
    /// # Returns
    ///
    /// * `Ok(LockStore)` - Database reachable and table present
    /// * `Err(SchedLockError::StorageError)` - Missing file, missing table, or I/O failure
    pub fn open<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            SchedLockError::StorageError(format!(
                "failed to open lock database '{}': {}",
                path.display(),
                e
            ))
        })?;

        conn.busy_timeout(config.busy_timeout())?;

        Self::from_connection(conn, Arc::new(SystemClock))
    }

    /// Wrap an already-open connection, validating the lock table.
    pub fn from_connection(conn: Connection, clock: Arc<dyn Clock>) -> Result<Self> {
        validate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            clock,
            node: node_identity(),
        })
    }

    /// The store's notion of "now".
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        // A transaction left open by a panicking holder makes the next
        // acquire refuse the connection.
        self.conn.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl LeaseStore for LockStore {
    fn acquire(&self, name: &str, expires_at: DateTime<Utc>) -> bool {
        LockStore::acquire(self, name, expires_at)
    }

    fn now(&self) -> DateTime<Utc> {
        LockStore::now(self)
    }
}

/// Probe the lock table with a lightweight lookup.
fn validate(conn: &Connection) -> Result<()> {
    let unusable = |e: rusqlite::Error| {
        SchedLockError::StorageError(format!(
            "lock table '{}' is not usable: {}",
            schema::TABLE_NAME,
            e
        ))
    };

    let mut stmt = conn.prepare(schema::GET_BY_NAME_QUERY).map_err(unusable)?;
    let mut rows = stmt.query([schema::PROBE_NAME]).map_err(unusable)?;
    rows.next().map_err(unusable)?;
    Ok(())
}
