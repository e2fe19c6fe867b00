//! # tabgraph
//!
//! Command-line front end for the tabgraph transformation engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/tabgraph (THE BINARY)         │
//! │                                               │
//! │  ┌─────────┐   ┌──────────┐   ┌───────────┐   │
//! │  │  CLI    │   │  input   │   │ settings  │   │
//! │  │ (clap)  │   │ csv/json │   │  (toml)   │   │
//! │  └────┬────┘   └────┬─────┘   └─────┬─────┘   │
//! │       └─────────────┼───────────────┘         │
//! │                     ▼                         │
//! │             ┌───────────────┐                 │
//! │             │ tabgraph-core │                 │
//! │             └───────────────┘                 │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! tabgraph transform -i datos_estudiantes.csv -o out/grafo
//! tabgraph validate -i datos_estudiantes.csv --strict
//! tabgraph hash -i datos_estudiantes.csv
//! tabgraph --config tabgraph.toml config
//! ```

use clap::Parser;
use tabgraph::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // TABGRAPH_LOG_FORMAT=json enables machine-parseable logs. Logs go to
    // stderr so stdout stays clean for --json-mode.
    let log_format = std::env::var("TABGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_level = if cli.verbose {
        "tabgraph=debug,tabgraph_core=debug"
    } else if cli.quiet || cli.json_mode {
        "tabgraph=warn,tabgraph_core=warn"
    } else {
        "tabgraph=info,tabgraph_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(cli::exit_code(&e));
    }
}

/// Print the startup banner.
fn print_banner() {
    eprintln!(
        "tabgraph v{} - tabular records to linked data",
        env!("CARGO_PKG_VERSION")
    );
}
