//! netgraph CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, and exits non-zero
//! on failure. Failures go through the structured logger so the
//! one-line-JSON contract holds on stderr too. All logic lives in the
//! library.

use netgraph::cli;
use netgraph::observability::Logger;

fn main() {
    if let Err(e) = cli::run() {
        Logger::error("command_failed", &[("error", &e.to_string())]);
        std::process::exit(1);
    }
}
