//! # HTTP Server Module
//!
//! Request-body normalization for axum, plus a small server that mounts
//! configured routes behind it.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/schemas` - Schemas of the guarded routes
//! - `POST <route>` - One per configured route

pub mod config;
pub mod middleware;
pub mod routes;
pub mod server;

pub use config::{ConfigError, HttpServerConfig, ResolvedRoute, RouteConfig};
pub use middleware::{normalize_body, NormalizeRejection, NormalizerState};
pub use server::HttpServer;
