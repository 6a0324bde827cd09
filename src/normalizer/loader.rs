//! Schema loader for reading schemas from disk at startup
//!
//! - One schema per `<name>.json` file
//! - The file stem is the schema name
//! - Unreadable or malformed files fail the load

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::Schema;

/// Schema loading errors
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed schema file '{path}': {reason}")]
    Malformed { path: String, reason: String },

    #[error("Schema '{0}' is already registered")]
    Duplicate(String),
}

impl SchemaError {
    fn io(path: &Path, source: io::Error) -> Self {
        SchemaError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Reads schema files and keeps them in a name-indexed registry.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    /// Directory relative schema paths are resolved against
    base_dir: PathBuf,
    /// Loaded schemas by name
    schemas: BTreeMap<String, Schema>,
}

impl SchemaLoader {
    /// Creates a loader resolving relative paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            schemas: BTreeMap::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves a possibly relative path against the base directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Reads and parses a single schema file without registering it.
    pub fn read_file(&self, path: &Path) -> SchemaResult<Schema> {
        parse_file(&self.resolve(path))
    }

    /// Loads every `*.json` file of a directory, keyed by file stem.
    ///
    /// Returns the names loaded, sorted.
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<Vec<String>> {
        let dir = self.resolve(dir);
        let entries = fs::read_dir(&dir).map_err(|e| SchemaError::io(&dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| SchemaError::io(&dir, e))?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        let mut names = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| SchemaError::Malformed {
                    path: path.display().to_string(),
                    reason: "file name is not valid UTF-8".into(),
                })?
                .to_string();

            let schema = parse_file(&path)?;
            self.register(name.clone(), schema)?;
            names.push(name);
        }

        Ok(names)
    }

    /// Registers a schema under a name. Names are write-once.
    pub fn register(&mut self, name: impl Into<String>, schema: Schema) -> SchemaResult<()> {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::Duplicate(name));
        }
        self.schemas.insert(name, schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Iterates registered schemas by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

fn parse_file(path: &Path) -> SchemaResult<Schema> {
    let content = fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;

    serde_json::from_str(&content).map_err(|e| SchemaError::Malformed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
