//! Config loading, validation, and lease resolution.

use super::model::Config;
use crate::error::{Result, SchedLockError};
use crate::lease::parse_lease;
use std::path::Path;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "schedlock.yaml";

/// Environment variable overriding `database`.
pub const DATABASE_ENV: &str = "SCHEDLOCK_DATABASE";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(SchedLockError::ConfigError)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            SchedLockError::ConfigError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Resolve the effective config for a CLI invocation.
    ///
    /// An explicit path must exist. Without one, `schedlock.yaml` in `dir` is
    /// used when present, defaults otherwise. `SCHEDLOCK_DATABASE` then
    /// overrides the database path.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if candidate.exists() {
                    Self::load(&candidate)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(database) = std::env::var(DATABASE_ENV)
            && !database.trim().is_empty()
        {
            config.database = database;
        }

        Ok(config)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            SchedLockError::ConfigError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            SchedLockError::ConfigError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `database` must be non-empty
    /// - `busy_timeout_ms` must be positive
    /// - every `leases` entry must be a valid lease duration
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(SchedLockError::ConfigError(
                "config validation failed: database must not be empty".to_string(),
            ));
        }

        if self.busy_timeout_ms == 0 {
            return Err(SchedLockError::ConfigError(
                "config validation failed: busy_timeout_ms must be greater than 0".to_string(),
            ));
        }

        for (alias, literal) in &self.leases {
            parse_lease(literal).map_err(|e| {
                SchedLockError::ConfigError(format!(
                    "config validation failed: lease alias '{}': {}",
                    alias, e
                ))
            })?;
        }

        Ok(())
    }

    /// Map a lease alias to its literal duration string.
    ///
    /// Falls back to the alias itself when no entry exists, so `--lease 1H`
    /// works without any configuration.
    pub fn resolve_lease<'a>(&'a self, alias: &'a str) -> &'a str {
        self.leases
            .get(alias)
            .map(String::as_str)
            .unwrap_or(alias)
    }

    /// Busy timeout as a std duration, for rusqlite.
    pub fn busy_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.busy_timeout_ms)
    }
}
