//! Logging setup and node identity.
//!
//! The library only emits `tracing` events. The binary installs a
//! subscriber through [`init`]; embedding applications install their own.

use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive (e.g. `debug`).
pub const LOG_ENV: &str = "SCHEDLOCK_LOG";

/// Install a global subscriber writing to stderr.
///
/// Returns `false` when a subscriber was already installed.
pub fn init(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}

/// Identity of this node for log events, as `user@host`.
pub fn node_identity() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
