//! CLI argument parsing for schedlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// schedlock: keep a scheduled job on one node at a time.
///
/// Every node runs the same schedule (cron, systemd timers, ...) and wraps
/// the job in `schedlock run`. Only the node that takes the lease runs the
/// job; the others skip that tick.
#[derive(Parser, Debug)]
#[command(name = "schedlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default: ./schedlock.yaml if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Lock database path; overrides config and SCHEDLOCK_DATABASE.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,
}

/// Available commands for schedlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the lock database and table.
    ///
    /// Idempotent: an existing table and its rows are left untouched.
    Init,

    /// Try once to take a lock.
    ///
    /// Exits 0 when granted and 4 when another lease is still live.
    Acquire(AcquireArgs),

    /// Run a program only if the lock is granted.
    ///
    /// A skipped run exits 0. A granted run exits with the program's code.
    Run(RunArgs),

    /// Show lock rows and whether their leases are live.
    Status(StatusArgs),
}

/// Arguments for the `acquire` command.
#[derive(Parser, Debug)]
pub struct AcquireArgs {
    /// Lock name (e.g., nightly-report).
    pub name: String,

    /// Lease duration (e.g., 1H30M) or an alias from config `leases`.
    #[arg(short, long)]
    pub lease: String,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Lock name (e.g., nightly-report).
    pub name: String,

    /// Lease duration (e.g., 1H30M) or an alias from config `leases`.
    #[arg(short, long)]
    pub lease: String,

    /// Program and arguments to run, after `--`.
    #[arg(last = true, required = true, num_args = 1..)]
    pub program: Vec<String>,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Only show this lock.
    pub name: Option<String>,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
