//! Connection settings that a lock transaction borrows and must give back.
//!
//! SQLite exposes two relevant knobs: whether the connection is in
//! auto-commit mode (no open transaction) and `read_uncommitted`, its only
//! isolation setting. With `read_uncommitted` off, SQLite transactions are
//! serializable, which covers the repeatable-read guarantee the acquire
//! algorithm needs.

use rusqlite::Connection;

/// Snapshot of a connection's transaction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionSettings {
    pub(crate) autocommit: bool,
    pub(crate) read_uncommitted: bool,
}

impl SessionSettings {
    /// Record the connection's current settings.
    pub(crate) fn capture(conn: &Connection) -> rusqlite::Result<Self> {
        let read_uncommitted: bool =
            conn.pragma_query_value(None, "read_uncommitted", |row| row.get(0))?;
        Ok(Self {
            autocommit: conn.is_autocommit(),
            read_uncommitted,
        })
    }

    /// Switch to the strictest isolation SQLite offers.
    pub(crate) fn apply_strict(conn: &Connection) -> rusqlite::Result<()> {
        conn.pragma_update(None, "read_uncommitted", false)
    }

    /// Put the connection back the way it was captured.
    ///
    /// A transaction still open at this point was ours; it is rolled back,
    /// never committed.
    pub(crate) fn restore(&self, conn: &Connection) -> rusqlite::Result<()> {
        if self.autocommit && !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
        }
        conn.pragma_update(None, "read_uncommitted", self.read_uncommitted)
    }
}
