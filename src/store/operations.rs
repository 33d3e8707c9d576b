//! Lock acquisition and read-only inspection.

use super::record::{LockRecord, encode_timestamp, is_encodable};
use super::schema;
use super::session::SessionSettings;
use super::LockStore;
use crate::error::{Result, SchedLockError};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tracing::{debug, info, instrument, warn};

/// What one acquisition transaction decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grant {
    /// No row existed; one was inserted.
    Inserted,
    /// An expired row was taken over.
    Renewed,
    /// A live lease exists; nothing was written.
    Held,
    /// The write touched no row (or more than one); rolled back.
    NotWritten,
}

impl Grant {
    fn granted(self) -> bool {
        matches!(self, Grant::Inserted | Grant::Renewed)
    }
}

impl LockStore {
    /// Try to take lock `name` until `expires_at`.
    ///
    /// # Returns
    ///
    /// * `true` - The lease was inserted or taken over by this call
    /// * `false` - Another lease is still live, the input was invalid, or the
    ///   storage round-trip failed (the transaction is rolled back)
    #[instrument(skip(self), fields(node = %self.node))]
    pub fn acquire(&self, name: &str, expires_at: DateTime<Utc>) -> bool {
        let now = self.now();

        if name.trim().is_empty() {
            warn!("refusing to acquire a lock with an empty name");
            return false;
        }
        if expires_at <= now {
            warn!(%now, "refusing to acquire: expiry is not after now");
            return false;
        }
        if !is_encodable(expires_at) {
            warn!("refusing to acquire: expiry is out of the storable range");
            return false;
        }

        let mut conn = self.connection();
        match guarded_acquire(&mut conn, name, expires_at, now) {
            Ok(Grant::Inserted) => {
                info!("lock acquired for the first time");
                true
            }
            Ok(Grant::Renewed) => {
                info!("lock acquired after previous lease expired");
                true
            }
            Ok(Grant::Held) => {
                debug!("lock is held by another lease");
                false
            }
            Ok(Grant::NotWritten) => {
                warn!("lock write affected no row; not granted");
                false
            }
            Err(e) => {
                warn!(error = %e, "lock acquisition failed; not granted");
                false
            }
        }
    }

    /// Read the row for `name`, if the lock was ever acquired.
    pub fn get(&self, name: &str) -> Result<Option<LockRecord>> {
        let conn = self.connection();
        let record = conn
            .query_row(
                schema::GET_BY_NAME_QUERY,
                params![name],
                LockRecord::from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Read every row, ordered by name.
    pub fn list(&self) -> Result<Vec<LockRecord>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(schema::LIST_QUERY)?;
        let records = stmt
            .query_map([], LockRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

/// Run one acquisition on a borrowed connection and hand it back as found.
///
/// A connection that is already inside a caller's transaction is refused:
/// the lock decision must not be folded into somebody else's unit of work.
pub(crate) fn guarded_acquire(
    conn: &mut Connection,
    name: &str,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Grant> {
    let prior = SessionSettings::capture(conn)?;
    if !prior.autocommit {
        return Err(SchedLockError::StorageError(
            "connection is already inside a transaction".to_string(),
        ));
    }

    let outcome = SessionSettings::apply_strict(conn)
        .map_err(SchedLockError::from)
        .and_then(|()| run_transaction(conn, name, expires_at, now));

    if let Err(e) = prior.restore(conn) {
        warn!(error = %e, "failed to restore connection settings");
    }

    outcome
}

fn run_transaction(
    conn: &mut Connection,
    name: &str,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Grant> {
    let tx = conn.transaction()?;
    let decision = decide(&tx, name, expires_at, now);

    match decision {
        Ok(grant) if grant.granted() || grant == Grant::Held => {
            tx.commit()?;
            Ok(grant)
        }
        Ok(grant) => {
            tx.rollback()?;
            Ok(grant)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(error = %rollback_err, "rollback after failed acquisition also failed");
            }
            Err(e.into())
        }
    }
}

/// The read-check-write sequence. Commit and rollback are the caller's job.
fn decide(
    tx: &Transaction<'_>,
    name: &str,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> rusqlite::Result<Grant> {
    let held: bool = tx.query_row(
        schema::HELD_QUERY,
        params![name, encode_timestamp(now)],
        |row| row.get(0),
    )?;
    if held {
        return Ok(Grant::Held);
    }

    let exists: bool = tx.query_row(schema::EXISTS_BY_NAME_QUERY, params![name], |row| {
        row.get(0)
    })?;

    let (affected, grant) = if exists {
        let affected = tx.execute(
            schema::UPDATE_QUERY,
            params![encode_timestamp(expires_at), encode_timestamp(now), name],
        )?;
        (affected, Grant::Renewed)
    } else {
        let affected = tx.execute(
            schema::INSERT_QUERY,
            params![name, encode_timestamp(expires_at), encode_timestamp(now)],
        )?;
        (affected, Grant::Inserted)
    };

    Ok(if affected == 1 { grant } else { Grant::NotWritten })
}
