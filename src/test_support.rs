use crate::clock::ManualClock;
use crate::config::Config;
use crate::store::{LockStore, create_table};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// An instant on a fixed test day.
pub(crate) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, 0).unwrap()
}

/// A database file with the lock table created.
pub(crate) fn create_test_database() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("locks.db");

    let conn = Connection::open(&path).unwrap();
    create_table(&conn).unwrap();

    (temp_dir, path)
}

/// Open a fresh connection with the default busy timeout.
pub(crate) fn connect(path: &Path) -> Connection {
    let conn = Connection::open(path).unwrap();
    conn.busy_timeout(Config::default().busy_timeout()).unwrap();
    conn
}

/// A store over a fresh database, driven by a manual clock.
pub(crate) fn create_test_store(start: DateTime<Utc>) -> (TempDir, PathBuf, LockStore, Arc<ManualClock>) {
    let (temp_dir, path) = create_test_database();
    let clock = Arc::new(ManualClock::new(start));
    let store = LockStore::from_connection(connect(&path), clock.clone()).unwrap();
    (temp_dir, path, store, clock)
}

/// Number of rows stored for `name`, read through a separate connection.
pub(crate) fn row_count(path: &Path, name: &str) -> i64 {
    connect(path)
        .query_row(
            "SELECT COUNT(*) FROM scheduler_lock WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap()
}
