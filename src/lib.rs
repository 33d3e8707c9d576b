//! schedlock: a lease-based lock that keeps a scheduled job on one node.
//!
//! Every node of a deployment runs the same schedule. Before a job body
//! runs, the node tries to take a named lease in a shared `scheduler_lock`
//! table; only the node that gets it runs the job, the others skip that
//! tick. Leases expire on their own, so a crashed node never blocks the
//! next run for longer than one lease.
//!
//! ```no_run
//! use schedlock::{Config, JobLock, LockClient, LockStore, Outcome};
//!
//! # fn main() -> schedlock::Result<()> {
//! let config = Config::default();
//! let store = LockStore::open(&config.database, &config)?;
//! let client = LockClient::new(store);
//!
//! let job = JobLock::new("nightly-report", "1H")?;
//! match client.run_guarded(&job, || println!("building report")) {
//!     Outcome::Ran(()) => {}
//!     Outcome::Skipped => println!("another node has it"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod lease;
pub mod logging;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{JobLock, LockClient, Outcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Result, SchedLockError};
pub use store::{LeaseStore, LockRecord, LockStore};
