//! schedlock: keep a scheduled job on one node at a time.
//!
//! This is the main entry point for the `schedlock` CLI. It parses
//! arguments, resolves configuration, installs logging, dispatches to the
//! appropriate command handler, and maps errors to exit codes.

mod cli;
mod commands;

use cli::Cli;
use commands::CommandContext;
use schedlock::{exit_codes, logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let result = CommandContext::resolve(&cli.global).and_then(|ctx| {
        logging::init(ctx.config.log_format);
        commands::dispatch(&ctx, cli.command)
    });

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code().clamp(0, 255) as u8)
        }
    }
}
