//! # tabgraph CLI Module
//!
//! This module implements the CLI interface for tabgraph.
//!
//! ## Available Commands
//!
//! - `transform` - Build the graph and write `.rdf`, `.ttl`, `.nt`, `.jsonld`
//! - `validate` - Build the graph in memory and print the integrity report
//! - `hash` - Print the canonical checksum of the graph
//! - `config` - Print the effective configuration as TOML

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabgraph_core::TabgraphError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// tabgraph - tabular records to RDF knowledge graphs
///
/// Every row becomes a student linked to deduplicated universities, cities,
/// departments and knowledge areas, plus one decision node per application.
#[derive(Parser, Debug)]
#[command(name = "tabgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the source table comes from.
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to the input table (CSV or JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Input format (csv, json); guessed from the extension when omitted
    #[arg(short = 't', long)]
    pub input_format: Option<String>,

    /// CSV field delimiter
    #[arg(short, long, default_value = ",")]
    pub delimiter: char,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transform a table and write the graph in every requested format
    Transform {
        #[command(flatten)]
        input: InputArgs,

        /// Output base path; one file per format is written as <base>.<ext>
        #[arg(short, long)]
        output: PathBuf,

        /// Comma-separated formats (rdfxml, turtle, ntriples, jsonld)
        #[arg(short, long)]
        formats: Option<String>,
    },

    /// Transform in memory and print the integrity report
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Exit with an error when any check fails
        #[arg(long)]
        strict: bool,
    },

    /// Compute the canonical BLAKE3 checksum of the graph
    Hash {
        #[command(flatten)]
        input: InputArgs,

        /// Include creation timestamps in the checksum
        #[arg(long)]
        include_timestamps: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Exit status for a run that failed before any row was processed.
pub const EXIT_CONFIGURATION: i32 = 2;

/// Exit status for every other failure.
pub const EXIT_FAILURE: i32 = 1;

/// Process exit status for `error`.
pub fn exit_code(error: &TabgraphError) -> i32 {
    if error.is_configuration() {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURE
    }
}

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), TabgraphError> {
    let config = crate::settings::load_config(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Transform {
            input,
            output,
            formats,
        } => cmd_transform(
            config,
            json_mode,
            cli.verbose,
            &input,
            &output,
            formats.as_deref(),
        ),
        Commands::Validate { input, strict } => cmd_validate(config, json_mode, &input, strict),
        Commands::Hash {
            input,
            include_timestamps,
        } => cmd_hash(config, json_mode, &input, include_timestamps),
        Commands::Config => cmd_config(&config, json_mode),
    }
}
