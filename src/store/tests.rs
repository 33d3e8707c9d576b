//! Tests for the lock store.

use super::operations::{Grant, guarded_acquire};
use super::session::SessionSettings;
use super::*;
use crate::test_support::{at, connect, create_test_database, create_test_store, row_count};
use chrono::Duration;
use std::sync::Barrier;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_first_acquire_inserts_row() {
    let (_temp_dir, path, store, _clock) = create_test_store(at(0, 0));

    assert!(store.acquire("cleanup", at(0, 10)));

    let record = store.get("cleanup").unwrap().unwrap();
    assert_eq!(record.name, "cleanup");
    assert_eq!(record.locked_at, at(0, 10));
    assert_eq!(record.locked_granted, at(0, 0));
    assert_eq!(row_count(&path, "cleanup"), 1);
}

#[test]
fn test_live_lease_is_not_granted_and_row_unchanged() {
    let (_temp_dir, _path, store, clock) = create_test_store(at(0, 0));
    assert!(store.acquire("cleanup", at(1, 0)));
    let before = store.get("cleanup").unwrap().unwrap();

    clock.set(at(0, 59));
    assert!(!store.acquire("cleanup", at(2, 0)));

    let after = store.get("cleanup").unwrap().unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_expired_lease_is_taken_over() {
    let (_temp_dir, path, store, clock) = create_test_store(at(0, 0));
    assert!(store.acquire("cleanup", at(1, 0)));

    clock.set(at(1, 30));
    assert!(store.acquire("cleanup", at(2, 30)));

    let record = store.get("cleanup").unwrap().unwrap();
    assert_eq!(record.locked_at, at(2, 30));
    assert_eq!(record.locked_granted, at(1, 30));
    assert_eq!(row_count(&path, "cleanup"), 1);
}

#[test]
fn test_lease_is_free_exactly_at_expiry() {
    let (_temp_dir, _path, store, clock) = create_test_store(at(0, 0));
    assert!(store.acquire("cleanup", at(1, 0)));

    // Held means locked_at > now, so the expiry instant itself is free.
    clock.set(at(1, 0));
    assert!(store.acquire("cleanup", at(2, 0)));
}

#[test]
fn test_nightly_report_schedule() {
    let (_temp_dir, path, store, clock) = create_test_store(at(0, 0));
    let lease = crate::lease::parse_lease("1h0m0s").unwrap();

    assert!(store.acquire("nightly-report", store.now() + lease));
    assert_eq!(store.get("nightly-report").unwrap().unwrap().locked_at, at(1, 0));

    clock.set(at(0, 30));
    assert!(!store.acquire("nightly-report", store.now() + lease));
    assert_eq!(store.get("nightly-report").unwrap().unwrap().locked_at, at(1, 0));

    clock.set(at(1, 5));
    assert!(store.acquire("nightly-report", store.now() + lease));
    let record = store.get("nightly-report").unwrap().unwrap();
    assert_eq!(record.locked_at, at(2, 5));
    assert_eq!(record.locked_granted, at(1, 5));

    assert_eq!(row_count(&path, "nightly-report"), 1);
}

#[test]
fn test_repeated_acquires_never_duplicate_rows() {
    let (_temp_dir, path, store, clock) = create_test_store(at(0, 0));

    for minute in 0..30 {
        clock.set(at(0, minute));
        let _ = store.acquire("cleanup", at(0, minute) + Duration::minutes(7));
    }

    assert_eq!(row_count(&path, "cleanup"), 1);
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_locks_are_independent() {
    let (_temp_dir, _path, store, _clock) = create_test_store(at(0, 0));

    assert!(store.acquire("a", at(1, 0)));
    assert!(store.acquire("b", at(1, 0)));
    assert!(!store.acquire("a", at(2, 0)));

    let names: Vec<String> = store.list().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_invalid_input_is_not_granted_and_writes_nothing() {
    let (_temp_dir, path, store, _clock) = create_test_store(at(1, 0));

    assert!(!store.acquire("", at(2, 0)));
    assert!(!store.acquire("  ", at(2, 0)));
    assert!(!store.acquire("cleanup", at(1, 0)));
    assert!(!store.acquire("cleanup", at(0, 30)));

    assert_eq!(row_count(&path, "cleanup"), 0);
    assert_eq!(row_count(&path, ""), 0);
    assert_eq!(row_count(&path, "  "), 0);
}

#[test]
fn test_get_unknown_lock_is_none() {
    let (_temp_dir, _path, store, _clock) = create_test_store(at(0, 0));
    assert!(store.get("never").unwrap().is_none());
}

#[test]
fn test_record_state_helpers() {
    let (_temp_dir, _path, store, _clock) = create_test_store(at(0, 0));
    assert!(store.acquire("cleanup", at(1, 0)));
    let record = store.get("cleanup").unwrap().unwrap();

    assert!(record.is_held(at(0, 30)));
    assert_eq!(record.remaining(at(0, 30)), Some(Duration::minutes(30)));
    assert!(!record.is_held(at(1, 0)));
    assert_eq!(record.remaining(at(1, 0)), None);
}

#[test]
fn test_fractional_expiry_is_stored_exactly() {
    let now = at(0, 0) + Duration::nanoseconds(123_456_789);
    let (_temp_dir, _path, store, _clock) = create_test_store(now);
    let expires_at = now + Duration::hours(1);

    assert!(store.acquire("nightly-report", expires_at));

    let record = store.get("nightly-report").unwrap().unwrap();
    assert_eq!(record.locked_at, expires_at);
    assert_eq!(record.locked_granted, now);
}

#[test]
fn test_shortest_lease_blocks_at_the_same_instant() {
    let now = at(0, 0) + Duration::nanoseconds(100);
    let (_temp_dir, _path, store, clock) = create_test_store(now);

    assert!(store.acquire("short", now + Duration::nanoseconds(1)));
    assert!(!store.acquire("short", now + Duration::hours(1)));

    clock.advance(Duration::nanoseconds(1));
    assert!(store.acquire("short", store.now() + Duration::hours(1)));
}

#[test]
fn test_open_fails_when_table_missing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.db");
    rusqlite::Connection::open(&path).unwrap();

    let err = LockStore::open(&path, &Config::default()).unwrap_err();
    assert!(matches!(err, SchedLockError::StorageError(_)));
    assert!(err.to_string().contains("scheduler_lock"));
}

#[test]
fn test_open_fails_when_database_missing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.db");

    let err = LockStore::open(&path, &Config::default()).unwrap_err();
    assert!(matches!(err, SchedLockError::StorageError(_)));
    // The store never creates the database as a side effect.
    assert!(!path.exists());
}

#[test]
fn test_open_succeeds_on_provisioned_database() {
    let (_temp_dir, path) = create_test_database();
    let store = LockStore::open(&path, &Config::default()).unwrap();
    assert!(store.acquire("cleanup", store.now() + Duration::minutes(5)));
}

#[test]
fn test_create_table_is_idempotent() {
    let (_temp_dir, path) = create_test_database();
    let conn = connect(&path);
    create_table(&conn).unwrap();
    create_table(&conn).unwrap();
}

#[test]
fn test_storage_failure_is_not_granted() {
    let (_temp_dir, path, store, _clock) = create_test_store(at(0, 0));

    connect(&path)
        .execute_batch("DROP TABLE scheduler_lock")
        .unwrap();

    assert!(!store.acquire("cleanup", at(1, 0)));
}

#[test]
fn test_failed_write_rolls_back() {
    let (_temp_dir, path, store, clock) = create_test_store(at(0, 0));
    assert!(store.acquire("cleanup", at(1, 0)));

    connect(&path)
        .execute_batch(
            "CREATE TRIGGER reject_update BEFORE UPDATE ON scheduler_lock
             BEGIN SELECT RAISE(ABORT, 'updates disabled'); END;",
        )
        .unwrap();

    clock.set(at(2, 0));
    assert!(!store.acquire("cleanup", at(3, 0)));

    let record = store.get("cleanup").unwrap().unwrap();
    assert_eq!(record.locked_at, at(1, 0));
    assert_eq!(record.locked_granted, at(0, 0));
}

#[test]
fn test_write_touching_no_row_is_not_granted() {
    let (_temp_dir, path, store, _clock) = create_test_store(at(0, 0));

    connect(&path)
        .execute_batch(
            "CREATE TRIGGER swallow_insert BEFORE INSERT ON scheduler_lock
             BEGIN SELECT RAISE(IGNORE); END;",
        )
        .unwrap();

    assert!(!store.acquire("cleanup", at(1, 0)));
    assert_eq!(row_count(&path, "cleanup"), 0);
}

#[test]
fn test_settings_restored_after_grant_skip_and_failure() {
    let (_temp_dir, path) = create_test_database();
    let mut conn = connect(&path);
    conn.pragma_update(None, "read_uncommitted", true).unwrap();
    let before = SessionSettings::capture(&conn).unwrap();
    assert!(before.read_uncommitted);

    // Granted
    let grant = guarded_acquire(&mut conn, "cleanup", at(1, 0), at(0, 0)).unwrap();
    assert_eq!(grant, Grant::Inserted);
    assert_eq!(SessionSettings::capture(&conn).unwrap(), before);

    // Held
    let grant = guarded_acquire(&mut conn, "cleanup", at(2, 0), at(0, 30)).unwrap();
    assert_eq!(grant, Grant::Held);
    assert_eq!(SessionSettings::capture(&conn).unwrap(), before);

    // Failure
    conn.execute_batch("DROP TABLE scheduler_lock").unwrap();
    assert!(guarded_acquire(&mut conn, "cleanup", at(3, 0), at(2, 0)).is_err());
    assert_eq!(SessionSettings::capture(&conn).unwrap(), before);
    assert!(conn.is_autocommit());
}

#[test]
fn test_connection_inside_transaction_is_refused() {
    let (_temp_dir, path) = create_test_database();
    let mut conn = connect(&path);
    conn.execute_batch("BEGIN").unwrap();

    let result = guarded_acquire(&mut conn, "cleanup", at(1, 0), at(0, 0));
    assert!(matches!(result, Err(SchedLockError::StorageError(_))));

    // The caller's transaction is left alone.
    assert!(!conn.is_autocommit());
    conn.execute_batch("ROLLBACK").unwrap();
    assert_eq!(row_count(&path, "cleanup"), 0);
}

#[test]
fn test_concurrent_acquires_grant_exactly_one() {
    let (_temp_dir, path) = create_test_database();
    let contenders = 8;
    let barrier = Arc::new(Barrier::new(contenders));

    let handles: Vec<_> = (0..contenders)
        .map(|_| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let store = LockStore::open(&path, &Config::default()).unwrap();
                barrier.wait();
                store.acquire("contended", store.now() + Duration::hours(1))
            })
        })
        .collect();

    let granted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|granted| *granted)
        .count();

    assert_eq!(granted, 1);
    assert_eq!(row_count(&path, "contended"), 1);
}

#[test]
fn test_concurrent_takeover_of_expired_lease_grants_exactly_one() {
    let (_temp_dir, path) = create_test_database();
    connect(&path)
        .execute(
            "INSERT INTO scheduler_lock (name, locked_at, locked_granted) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                "contended",
                "2000-01-01T01:00:00.000000000Z",
                "2000-01-01T00:00:00.000000000Z"
            ],
        )
        .unwrap();

    let contenders = 8;
    let barrier = Arc::new(Barrier::new(contenders));

    let handles: Vec<_> = (0..contenders)
        .map(|_| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let store = LockStore::open(&path, &Config::default()).unwrap();
                barrier.wait();
                store.acquire("contended", store.now() + Duration::hours(1))
            })
        })
        .collect();

    let granted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|granted| *granted)
        .count();

    assert_eq!(granted, 1);
    assert_eq!(row_count(&path, "contended"), 1);
}
