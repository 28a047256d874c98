//! CLI module for netgraph
//!
//! Provides the command-line interface:
//! - join: assemble the joined tree from a root snapshot
//! - show: summarize or list a snapshot
//! - verify: checksum and invariant check

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{join, run_command, show, verify};
pub use errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}
