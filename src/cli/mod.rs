//! CLI module for docpipe
//!
//! Provides command-line interface for:
//! - compile: Build one pipeline from a JSON request
//! - catalog: Read a named pipeline from the configured catalog
//! - schemas: List registered entities and their relationships

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    catalog, compile, run, run_command, schemas, CatalogRequest, CompileRequest, Context,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_envelope, ok_envelope, parse_request, read_request, write_error, write_response};
