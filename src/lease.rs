//! Lease duration parsing.
//!
//! Lease durations use the time part of ISO-8601 durations, written without
//! the leading `PT`: `1H`, `30M`, `1h0m0s`, `2.5S`. Components must appear
//! in hours-minutes-seconds order, each at most once, and only seconds may
//! carry a fraction. The `PT` prefix is accepted too, and case is ignored.

use crate::error::{Result, SchedLockError};
use chrono::Duration;
use regex::Regex;
use std::sync::LazyLock;

static LEASE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:PT)?(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.(\d{1,9}))?S)?$")
        .expect("Invalid lease regex")
});

/// Parse a literal lease duration such as `1h0m0s`.
///
/// # Returns
///
/// * `Ok(Duration)` - A strictly positive duration
/// * `Err(SchedLockError::ConfigError)` - Malformed, empty, zero, or overflowing
pub fn parse_lease(input: &str) -> Result<Duration> {
    let trimmed = input.trim();
    let malformed = || {
        SchedLockError::ConfigError(format!(
            "invalid lease duration '{}': expected hours-minutes-seconds such as '1H30M' or '45S'",
            input
        ))
    };

    let caps = LEASE_REGEX.captures(trimmed).ok_or_else(malformed)?;
    if caps.get(1).is_none() && caps.get(2).is_none() && caps.get(3).is_none() {
        return Err(malformed());
    }

    let component = |idx: usize| -> Result<i64> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse::<i64>().map_err(|_| malformed()),
            None => Ok(0),
        }
    };
    let hours = component(1)?;
    let minutes = component(2)?;
    let seconds = component(3)?;

    let total_secs = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(malformed)?;

    let nanos = match caps.get(4) {
        Some(m) => {
            let digits = m.as_str();
            let padded = format!("{:0<9}", digits);
            padded.parse::<i64>().map_err(|_| malformed())?
        }
        None => 0,
    };

    let lease = Duration::try_seconds(total_secs)
        .and_then(|secs| secs.checked_add(&Duration::nanoseconds(nanos)))
        .ok_or_else(malformed)?;

    if lease <= Duration::zero() {
        return Err(SchedLockError::ConfigError(format!(
            "invalid lease duration '{}': lease must be longer than zero",
            input
        )));
    }

    Ok(lease)
}

/// Format a duration the way leases are written, e.g. `1H5M`.
pub fn format_lease(lease: Duration) -> String {
    let total = lease.num_seconds();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if seconds > 0 || out.is_empty() {
        out.push_str(&format!("{}S", seconds));
    }
    out
}
