//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for schedlock.
///
/// This struct represents the contents of `schedlock.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Storage settings
    // =========================================================================
    /// Path to the SQLite database holding the `scheduler_lock` table.
    #[serde(default = "default_database")]
    pub database: String,

    /// How long a connection waits on the database file lock before giving up.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    // =========================================================================
    // Logging settings
    // =========================================================================
    /// Log output format for the CLI.
    #[serde(default)]
    pub log_format: LogFormat,

    // =========================================================================
    // Lease settings
    // =========================================================================
    /// Lease aliases: alias name to literal duration (e.g. `nightly: 1H`).
    ///
    /// A lease value that is not an alias is used as a literal duration.
    #[serde(default)]
    pub leases: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            busy_timeout_ms: default_busy_timeout_ms(),
            log_format: LogFormat::default(),
            leases: BTreeMap::new(),
        }
    }
}
