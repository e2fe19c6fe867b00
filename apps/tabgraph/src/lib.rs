//! # tabgraph
//!
//! The application half of tabgraph: command definitions, table loading and
//! configuration files. The transformation itself lives in `tabgraph-core`.

pub mod cli;
pub mod input;
pub mod settings;
