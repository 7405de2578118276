//! CLI argument definitions using clap
//!
//! Commands:
//! - docpipe --config <path> compile
//! - docpipe --config <path> catalog
//! - docpipe --config <path> schemas

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docpipe - schema-driven aggregation pipeline compiler
#[derive(Parser, Debug)]
#[command(name = "docpipe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./docpipe.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Compile one pipeline request read from stdin
    Compile,

    /// Read a named pipeline from the catalog; request on stdin
    Catalog,

    /// List registered entities
    Schemas,
}

impl Command {
    /// True if the command reads a request from stdin
    pub fn reads_stdin(&self) -> bool {
        !matches!(self, Command::Schemas)
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
