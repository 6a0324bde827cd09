//! CLI module for paramnorm
//!
//! Provides command-line interface for:
//! - check: Normalize one params record against a schema file
//! - serve: Run the HTTP server with normalized routes

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, check_params, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_params, read_params, write_json};
