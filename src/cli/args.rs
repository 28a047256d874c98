//! CLI argument definitions using clap
//!
//! Commands:
//! - netgraph join --snapshot <path> --out <path> [--config <path>]
//! - netgraph show --snapshot <path> [--app <app> --model <model>]
//! - netgraph verify --snapshot <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// netgraph - deterministic inventory graph assembler
#[derive(Parser, Debug)]
#[command(name = "netgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble the joined tree from a root snapshot
    Join {
        /// Path to the root snapshot
        #[arg(long)]
        snapshot: PathBuf,

        /// Path to write the joined tree snapshot
        #[arg(long)]
        out: PathBuf,

        /// Path to an engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summarize a snapshot, or list one app/model bucket
    Show {
        /// Path to the snapshot
        #[arg(long)]
        snapshot: PathBuf,

        /// Application label to list
        #[arg(long, requires = "model")]
        app: Option<String>,

        /// Model name to list
        #[arg(long, requires = "app")]
        model: Option<String>,
    },

    /// Verify a snapshot's checksum and record invariants
    Verify {
        /// Path to the snapshot
        #[arg(long)]
        snapshot: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
