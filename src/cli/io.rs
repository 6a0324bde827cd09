//! JSON I/O handling for CLI
//!
//! - Input: one JSON object, from a file or stdin
//! - Output: one JSON document on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::{CliError, CliResult};

/// Read a params record from a file, or from stdin when no path is given
pub fn read_params(path: Option<&Path>) -> CliResult<Map<String, Value>> {
    let content = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read params '{}': {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };

    parse_params(&content)
}

/// Parse a params record. Blank input and `null` are an empty record.
pub fn parse_params(content: &str) -> CliResult<Map<String, Value>> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(content)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(CliError::io_error("Params must be a JSON object")),
    }
}

/// Write a serializable value to stdout as one JSON document
pub fn write_json<T: Serialize>(value: &T, pretty: bool) -> CliResult<()> {
    let mut stdout = io::stdout();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
