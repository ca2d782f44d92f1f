//! CLI command definitions for the `infraplan` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod boq;
pub mod chat;
pub mod check;
pub mod questions;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Gather infrastructure requirements through a guided conversation and
/// turn them into a priced bill of quantities.
#[derive(Parser)]
#[command(name = "infraplan", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Path to config.toml (defaults to $INFRAPLAN_CONFIG, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive requirements interview.
    Chat {
        /// Render the BOQ as soon as the interview completes.
        #[arg(long)]
        boq: bool,

        /// Save the final summary table to a file.
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,
    },

    /// Render a BOQ from a saved summary table.
    Boq {
        /// File containing the Section / Question / User Response table.
        summary: PathBuf,

        /// Write the BOQ to a file instead of printing it.
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Print the active question bank.
    Questions,

    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to server.port in config).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to server.host in config).
        #[arg(long)]
        host: Option<String>,
    },

    /// Check that the configured LLM provider answers.
    Check,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
