//! CLI command implementations
//!
//! - check: normalize one params record and print `{processed, validated}`
//! - serve: load the server config, mount routes, serve until ctrl-c

use std::io;
use std::path::Path;

use tokio::net::TcpListener;

use crate::http_server::{HttpServer, HttpServerConfig};
use crate::normalizer::{normalize, Normalized, Schema, SchemaLoader};
use crate::observability::{log_event, log_event_with_fields, Event, Logger};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_params, write_json};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check {
            schema,
            params,
            pretty,
        } => check(&schema, params.as_deref(), pretty),
        Command::Serve { config, port } => serve(&config, port),
    }
}

/// Normalize one params record against a schema file.
///
/// The result always goes to stdout. A record with validation errors is
/// still printed, then reported as a `ValidationFailed` error.
pub fn check(schema_path: &Path, params_path: Option<&Path>, pretty: bool) -> CliResult<()> {
    let outcome = check_params(schema_path, params_path)?;
    write_json(&outcome, pretty)?;

    let errors = outcome.validated.issues().len();
    let status = outcome.is_valid().to_string();
    let count = errors.to_string();
    let fields = [
        ("schema", schema_path.to_str().unwrap_or("<non-utf8>")),
        ("status", status.as_str()),
        ("errors", count.as_str()),
    ];

    // stdout carries the result
    let event = Event::CheckComplete;
    if Logger::enabled(event.severity()) {
        Logger::log_to_writer(event.severity(), event.as_str(), &fields, &mut io::stderr());
    }

    if outcome.is_valid() {
        Ok(())
    } else {
        Err(CliError::validation_failed(errors))
    }
}

/// Load the schema and params and run the normalizer
pub fn check_params(schema_path: &Path, params_path: Option<&Path>) -> CliResult<Normalized> {
    let schema: Schema = SchemaLoader::new(".").read_file(schema_path)?;
    let params = read_params(params_path)?;

    Ok(normalize(&params, &schema))
}

/// Serve the configured routes.
///
/// Startup order: config load, log level, route schemas, bind. Any failure
/// before the listener is bound logs `BootFailed` and aborts.
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    log_event(Event::BootStart);

    let server = boot(config_path, port).map_err(boot_failed)?;

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        boot_failed(CliError::boot_failed(format!(
            "Failed to create tokio runtime: {}",
            e
        )))
    })?;

    rt.block_on(async {
        let listener = bind(&server).await?;
        server
            .serve(listener)
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Bind the server's address, logging `BootFailed` if it is unavailable
async fn bind(server: &HttpServer) -> CliResult<TcpListener> {
    server.bind().await.map_err(|e| {
        boot_failed(CliError::boot_failed(format!(
            "Failed to bind {}: {}",
            server.socket_addr(),
            e
        )))
    })
}

fn boot_failed(e: CliError) -> CliError {
    log_event_with_fields(Event::BootFailed, &[("reason", e.message())]);
    e
}

/// Load config and schemas into a ready-to-start server
fn boot(config_path: &Path, port: Option<u16>) -> CliResult<HttpServer> {
    let mut config = HttpServerConfig::load(config_path)?;
    if let Some(port) = port {
        config.port = port;
    }

    Logger::set_min_severity(config.severity()?);

    let path = config_path.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("path", path.as_str()), ("addr", config.socket_addr().as_str())],
    );

    let server = HttpServer::from_config(config)?;

    let count = server.routes().len().to_string();
    log_event_with_fields(Event::SchemasLoaded, &[("routes", count.as_str())]);

    Ok(server)
}
