//! HTTP Server Configuration
//!
//! Loaded from a JSON file. Everything except the routes has a default:
//!
//! ```json
//! {
//!   "host": "0.0.0.0",
//!   "port": 54321,
//!   "body_limit_bytes": 1048576,
//!   "log_level": "info",
//!   "schema_dir": "schemas",
//!   "routes": [
//!     { "path": "/products", "schema_file": "schemas/product.json" },
//!     { "path": "/ping", "schema": { "at": { "type": "number", "required": true } } }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.
//! Every `<name>.json` under `schema_dir` mounts `POST /<name>`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalizer::{Schema, SchemaError, SchemaLoader};
use crate::observability::Severity;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Paths served by the server itself
pub const RESERVED_PATHS: [&str; 2] = ["/health", "/schemas"];

/// One route guarded by the param normalizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Request path, must start with `/`
    pub path: String,

    /// Schema file, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_file: Option<PathBuf>,

    /// Inline schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// A route with its schema loaded
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub path: String,
    pub schema: Arc<Schema>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 54321)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Largest request body the normalizer reads (default: 1 MiB)
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Minimum log severity (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory of schemas mounted by file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<PathBuf>,

    /// Explicit routes
    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    /// Directory the config was loaded from
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    54321
}

fn default_body_limit() -> usize {
    1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            body_limit_bytes: default_body_limit(),
            log_level: default_log_level(),
            schema_dir: None,
            routes: Vec::new(),
            base_dir: PathBuf::from("."),
        }
    }
}

/// Checks that a path is a plain literal route.
///
/// Capture (`:name`), wildcard (`*rest`) and brace segments are refused.
/// The router panics on malformed or overlapping captures.
pub fn check_route_path(path: &str) -> Result<(), ConfigError> {
    if !path.starts_with('/') {
        return Err(ConfigError::Invalid(format!(
            "route path '{}' must start with '/'",
            path
        )));
    }
    if let Some(c) = path
        .chars()
        .find(|c| matches!(c, ':' | '*' | '{' | '}') || c.is_control() || c.is_whitespace())
    {
        return Err(ConfigError::Invalid(format!(
            "route path '{}' contains '{}', only literal paths can be mounted",
            path,
            c.escape_default()
        )));
    }
    Ok(())
}

/// An allowed CORS origin must be `http://` or `https://` and a valid
/// header value.
fn check_origin(origin: &str) -> Result<(), ConfigError> {
    let has_scheme = origin.starts_with("http://") || origin.starts_with("https://");
    if !has_scheme || HeaderValue::from_str(origin).is_err() {
        return Err(ConfigError::Invalid(format!(
            "cors origin '{}' is not a valid origin",
            origin.escape_default()
        )));
    }
    Ok(())
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut config: HttpServerConfig = serde_json::from_str(&content)?;
        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        config.validate()?;
        Ok(config)
    }

    /// Validate field values and route declarations
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.body_limit_bytes == 0 {
            return Err(ConfigError::Invalid("body_limit_bytes must be > 0".into()));
        }

        self.severity()?;

        for origin in &self.cors_origins {
            check_origin(origin)?;
        }

        let mut seen = HashSet::new();
        for route in &self.routes {
            check_route_path(&route.path)?;
            if route.schema_file.is_some() == route.schema.is_some() {
                return Err(ConfigError::Invalid(format!(
                    "route '{}' needs exactly one of schema_file or schema",
                    route.path
                )));
            }
            if !seen.insert(route.path.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "route '{}' is declared more than once",
                    route.path
                )));
            }
        }

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> Result<Severity, ConfigError> {
        self.log_level.parse().map_err(ConfigError::Invalid)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Loads every route schema.
    ///
    /// `schema_dir` routes come first, in file name order, followed by the
    /// explicit routes in declaration order.
    pub fn resolve_routes(&self) -> Result<Vec<ResolvedRoute>, ConfigError> {
        let mut loader = SchemaLoader::new(&self.base_dir);
        let mut resolved = Vec::new();

        if let Some(dir) = &self.schema_dir {
            for name in loader.load_dir(dir)? {
                let path = format!("/{}", name);
                check_route_path(&path)?;
                if let Some(schema) = loader.get(&name) {
                    resolved.push(ResolvedRoute {
                        path,
                        schema: Arc::new(schema.clone()),
                    });
                }
            }
        }

        for route in &self.routes {
            check_route_path(&route.path)?;
            let schema = match (&route.schema, &route.schema_file) {
                (Some(schema), _) => schema.clone(),
                (None, Some(file)) => loader.read_file(file)?,
                (None, None) => {
                    return Err(ConfigError::Invalid(format!(
                        "route '{}' has no schema",
                        route.path
                    )))
                }
            };

            if resolved.iter().any(|r| r.path == route.path) {
                return Err(ConfigError::Invalid(format!(
                    "route '{}' is declared more than once",
                    route.path
                )));
            }

            resolved.push(ResolvedRoute {
                path: route.path.clone(),
                schema: Arc::new(schema),
            });
        }

        if let Some(route) = resolved.iter().find(|r| RESERVED_PATHS.contains(&r.path.as_str())) {
            return Err(ConfigError::Invalid(format!(
                "route '{}' is reserved by the server",
                route.path
            )));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{FieldDef, FieldType};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = HttpServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 54321);
        assert_eq!(config.body_limit_bytes, 1024 * 1024);
        assert_eq!(config.severity().unwrap(), Severity::Info);
        assert!(config.cors_origins.is_empty());
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = HttpServerConfig::with_port(8080);
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_load_applies_defaults_and_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("paramnorm.json");
        fs::write(&path, r#"{"port": 9000}"#).unwrap();

        let config = HttpServerConfig::load(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.base_dir, temp_dir.path());
    }

    #[test]
    fn test_rejects_zero_body_limit() {
        let config = HttpServerConfig {
            body_limit_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let config = HttpServerConfig {
            log_level: "chatty".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_route_needs_exactly_one_schema_source() {
        let mut config = HttpServerConfig::default();
        config.routes.push(RouteConfig {
            path: "/a".into(),
            schema_file: None,
            schema: None,
        });
        assert!(config.validate().is_err());

        config.routes[0].schema = Some(Schema::new());
        config.routes[0].schema_file = Some(PathBuf::from("a.json"));
        assert!(config.validate().is_err());

        config.routes[0].schema_file = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_route_path_rules() {
        let route = |path: &str| RouteConfig {
            path: path.into(),
            schema_file: None,
            schema: Some(Schema::new()),
        };

        let mut config = HttpServerConfig::default();
        config.routes.push(route("products"));
        assert!(config.validate().is_err());

        config.routes = vec![route("/a"), route("/a")];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_route_path_rejects_router_syntax() {
        for path in ["/a/*", "/a/*rest", "/:id", "/users/:id", "/{id}", "/a b", "/a\n"] {
            let config = HttpServerConfig {
                routes: vec![RouteConfig {
                    path: path.into(),
                    schema_file: None,
                    schema: Some(Schema::new()),
                }],
                ..Default::default()
            };

            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "validate accepted '{}'",
                path
            );
            assert!(
                matches!(config.resolve_routes(), Err(ConfigError::Invalid(_))),
                "resolve_routes accepted '{}'",
                path
            );
        }

        assert!(check_route_path("/v1/products").is_ok());
        assert!(check_route_path("/").is_ok());
    }

    #[test]
    fn test_schema_dir_stem_must_be_literal_path() {
        let temp_dir = TempDir::new().unwrap();
        let schemas = temp_dir.path().join("schemas");
        fs::create_dir(&schemas).unwrap();
        fs::write(schemas.join(":id.json"), r#"{"a": {"type": "string"}}"#).unwrap();

        let config = HttpServerConfig {
            base_dir: temp_dir.path().to_path_buf(),
            schema_dir: Some(PathBuf::from("schemas")),
            ..Default::default()
        };

        assert!(matches!(
            config.resolve_routes(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_resolve_routes_rejects_duplicates_without_validate() {
        let route = RouteConfig {
            path: "/a".into(),
            schema_file: None,
            schema: Some(Schema::new()),
        };
        let config = HttpServerConfig {
            routes: vec![route.clone(), route],
            ..Default::default()
        };

        let err = config.resolve_routes().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_bad_cors_origin() {
        for origin in ["localhost:3000", "http://bad\norigin", ""] {
            let config = HttpServerConfig {
                cors_origins: vec![origin.to_string()],
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "validate accepted origin '{}'",
                origin
            );
        }

        let config = HttpServerConfig {
            cors_origins: vec!["https://app.example.com".into(), "http://localhost:5173".into()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_routes() {
        let temp_dir = TempDir::new().unwrap();
        let schemas = temp_dir.path().join("schemas");
        fs::create_dir(&schemas).unwrap();
        fs::write(
            schemas.join("user.json"),
            r#"{"email": {"type": "string", "required": true}}"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("product.json"),
            r#"{"price": {"type": "number", "required": true}}"#,
        )
        .unwrap();

        let config_path = temp_dir.path().join("paramnorm.json");
        fs::write(
            &config_path,
            r#"{
                "schema_dir": "schemas",
                "routes": [
                    {"path": "/products", "schema_file": "product.json"},
                    {"path": "/ping", "schema": {"at": {"type": "number"}}}
                ]
            }"#,
        )
        .unwrap();

        let config = HttpServerConfig::load(&config_path).unwrap();
        let routes = config.resolve_routes().unwrap();

        let paths: Vec<_> = routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/user", "/products", "/ping"]);
        assert_eq!(
            routes[1].schema.get("price"),
            Some(&FieldDef::required(FieldType::Number))
        );
        assert_eq!(
            routes[2].schema.get("at"),
            Some(&FieldDef::optional(FieldType::Number))
        );
    }

    #[test]
    fn test_resolve_routes_rejects_reserved_path() {
        let config = HttpServerConfig {
            routes: vec![RouteConfig {
                path: "/health".into(),
                schema_file: None,
                schema: Some(Schema::new()),
            }],
            ..Default::default()
        };

        let err = config.resolve_routes().unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_resolve_routes_missing_schema_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = HttpServerConfig {
            base_dir: temp_dir.path().to_path_buf(),
            routes: vec![RouteConfig {
                path: "/a".into(),
                schema_file: Some(PathBuf::from("missing.json")),
                schema: None,
            }],
            ..Default::default()
        };

        assert!(matches!(
            config.resolve_routes(),
            Err(ConfigError::Schema(SchemaError::Io { .. }))
        ));
    }
}
