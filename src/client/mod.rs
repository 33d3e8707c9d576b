//! Lock Client: duration-based guarded calls on top of a lease store.
//!
//! Callers never deal with absolute timestamps. They name a lock and a lease
//! duration; the client computes the expiry from the store's clock, asks the
//! store, and either runs the action or reports it as skipped. Overlapping
//! runs of the same job therefore collapse into no-ops instead of queuing.
//!
//! A [`JobLock`] is built once per scheduled job and reused on every tick,
//! so the lease string is resolved and parsed exactly once.


use crate::config::Config;
use crate::error::{Result, SchedLockError};
use crate::lease::{format_lease, parse_lease};
use crate::store::LeaseStore;
use chrono::Duration;
use tracing::{debug, info, warn};

/// Result of a guarded call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The lock was granted and the action ran, producing this value.
    Ran(T),
    /// The lock was not granted; the action was not invoked.
    Skipped,
}

impl<T> Outcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped)
    }

    /// The action's value, or `None` if it was skipped.
    pub fn ran(self) -> Option<T> {
        match self {
            Outcome::Ran(value) => Some(value),
            Outcome::Skipped => None,
        }
    }
}

/// A named lock with its lease, resolved once per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLock {
    name: String,
    lease: Duration,
}

impl JobLock {
    /// Build a job lock from a literal lease such as `1h0m0s`.
    ///
    /// # Returns
    ///
    /// * `Err(SchedLockError::UserError)` - Empty lock name
    /// * `Err(SchedLockError::ConfigError)` - Malformed or zero lease
    pub fn new(name: impl Into<String>, lease: &str) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchedLockError::UserError(
                "lock name must not be empty".to_string(),
            ));
        }

        let lease = parse_lease(lease).map_err(|e| match e {
            SchedLockError::ConfigError(msg) => {
                SchedLockError::ConfigError(format!("lock '{}': {}", name, msg))
            }
            other => other,
        })?;

        Ok(Self { name, lease })
    }

    /// Build a job lock whose lease may be an alias from `config.leases`.
    pub fn from_config(name: impl Into<String>, lease_alias: &str, config: &Config) -> Result<Self> {
        Self::new(name, config.resolve_lease(lease_alias))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lease(&self) -> Duration {
        self.lease
    }
}

impl std::fmt::Display for JobLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (lease {})", self.name, format_lease(self.lease))
    }
}

/// Runs actions only while holding a lease from `S`.
#[derive(Debug, Clone)]
pub struct LockClient<S> {
    store: S,
}

impl<S: LeaseStore> LockClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Try to take `lock_name` for `lease`; run `action` only if granted.
    ///
    /// Whatever `action` returns, including an `Err`, comes back inside
    /// [`Outcome::Ran`] untouched.
    pub fn try_run<T, F>(&self, lock_name: &str, lease: Duration, action: F) -> Outcome<T>
    where
        F: FnOnce() -> T,
    {
        let now = self.store.now();
        let Some(expires_at) = now.checked_add_signed(lease) else {
            warn!(lock = lock_name, "lease overflows the calendar; job skipped");
            return Outcome::Skipped;
        };

        if !self.store.acquire(lock_name, expires_at) {
            info!(lock = lock_name, "job skipped because the lock is held");
            return Outcome::Skipped;
        }

        debug!(lock = lock_name, %expires_at, "running guarded job");
        Outcome::Ran(action())
    }

    /// Guarded call for a pre-resolved job lock.
    pub fn run_guarded<T, F>(&self, job: &JobLock, action: F) -> Outcome<T>
    where
        F: FnOnce() -> T,
    {
        self.try_run(&job.name, job.lease, action)
    }
}
