//! Lock rows and their timestamp encoding.

use chrono::{DateTime, Datelike, Duration, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use serde::Serialize;

/// Latest instant the fixed-width text encoding can represent.
pub(crate) const MAX_YEAR: i32 = 9999;

/// One row of the lock table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockRecord {
    /// Lock name (primary key).
    pub name: String,

    /// When the current lease expires.
    pub locked_at: DateTime<Utc>,

    /// When the lease was last granted.
    pub locked_granted: DateTime<Utc>,
}

impl LockRecord {
    /// A lock is held while its expiry is strictly in the future.
    pub fn is_held(&self, now: DateTime<Utc>) -> bool {
        self.locked_at > now
    }

    /// Time left on a live lease, `None` once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.is_held(now).then(|| self.locked_at - now)
    }

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            locked_at: decode_timestamp(row, 1)?,
            locked_granted: decode_timestamp(row, 2)?,
        })
    }
}

/// Encode as `YYYY-MM-DDTHH:MM:SS.fffffffffZ`.
///
/// Nanosecond precision matches `DateTime<Utc>`, so a stored instant decodes
/// to exactly the value written. Every encoded value has the same width, so
/// SQL text comparison orders timestamps chronologically.
pub(crate) fn encode_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Whether `instant` fits the fixed-width encoding.
pub(crate) fn is_encodable(instant: DateTime<Utc>) -> bool {
    (0..=MAX_YEAR).contains(&instant.year())
}

fn decode_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
