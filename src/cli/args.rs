//! CLI argument definitions using clap
//!
//! Commands:
//! - paramnorm check --schema <path> [--params <path>] [--pretty]
//! - paramnorm serve --config <path> [--port <port>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// paramnorm - schema-driven request parameter normalization
#[derive(Parser, Debug)]
#[command(name = "paramnorm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize one params record against a schema and print the result
    Check {
        /// Path to the schema file
        #[arg(long)]
        schema: PathBuf,

        /// Path to the params file (reads one JSON object from stdin if omitted)
        #[arg(long)]
        params: Option<PathBuf>,

        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },

    /// Serve the configured routes behind the normalizer
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./paramnorm.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "paramnorm",
            "check",
            "--schema",
            "product.json",
            "--params",
            "body.json",
        ])
        .unwrap();

        match cli.command {
            Command::Check {
                schema,
                params,
                pretty,
            } => {
                assert_eq!(schema, PathBuf::from("product.json"));
                assert_eq!(params, Some(PathBuf::from("body.json")));
                assert!(!pretty);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_schema() {
        assert!(Cli::try_parse_from(["paramnorm", "check"]).is_err());
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["paramnorm", "serve"]).unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert_eq!(config, PathBuf::from("./paramnorm.json"));
                assert_eq!(port, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
