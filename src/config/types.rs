//! Configuration types and defaults for schedlock.

use serde::{Deserialize, Serialize};

/// Output format of the log subscriber installed by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines (default).
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

// Default value functions for serde
pub(crate) fn default_database() -> String {
    "schedlock.db".to_string()
}
pub(crate) fn default_busy_timeout_ms() -> u64 {
    5000
}
