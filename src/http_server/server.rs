//! # HTTP Server
//!
//! Mounts every configured route behind the param normalizer.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::{HttpServerConfig, ResolvedRoute};
use super::routes::{guarded_route, health_routes, schema_routes};
use crate::observability::{log_event_with_fields, Event};

/// HTTP server for normalized routes
pub struct HttpServer {
    config: HttpServerConfig,
    routes: Vec<ResolvedRoute>,
    router: Router,
}

impl HttpServer {
    /// Create a server for already resolved routes
    pub fn new(config: HttpServerConfig, routes: Vec<ResolvedRoute>) -> Self {
        let router = Self::build_router(&config, &routes);
        Self {
            config,
            routes,
            router,
        }
    }

    /// Resolve the configured routes and build the server
    pub fn from_config(config: HttpServerConfig) -> Result<Self, super::ConfigError> {
        let routes = config.resolve_routes()?;
        Ok(Self::new(config, routes))
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, routes: &[ResolvedRoute]) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                // entries are checked by HttpServerConfig::validate
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let mut router = Router::new()
            .merge(health_routes())
            .merge(schema_routes(routes));

        for route in routes {
            router = router.merge(guarded_route(route, config.body_limit_bytes));
        }

        router.layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Guarded routes, in mount order
    pub fn routes(&self) -> &[ResolvedRoute] {
        &self.routes
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until ctrl-c
    pub async fn start(self) -> Result<(), std::io::Error> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener, std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        TcpListener::bind(addr).await
    }

    /// Serve on an already bound listener until ctrl-c
    pub async fn serve(self, listener: TcpListener) -> Result<(), std::io::Error> {
        for route in &self.routes {
            let fields = route.schema.len().to_string();
            log_event_with_fields(
                Event::RouteMounted,
                &[("path", route.path.as_str()), ("fields", fields.as_str())],
            );
        }

        let bound = listener.local_addr()?.to_string();
        log_event_with_fields(Event::ServerListening, &[("addr", bound.as_str())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log_event_with_fields(Event::ShutdownComplete, &[("addr", bound.as_str())]);
        Ok(())
    }
}

async fn shutdown_signal() {
    // if the handler cannot be installed the server runs until killed
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::normalizer::{FieldDef, FieldType, Schema};

    fn product_route() -> ResolvedRoute {
        ResolvedRoute {
            path: "/products".into(),
            schema: Arc::new(
                Schema::new().field("name", FieldDef::required(FieldType::String)),
            ),
        }
    }

    #[test]
    fn test_server_creation() {
        let server = HttpServer::new(HttpServerConfig::default(), vec![product_route()]);
        assert_eq!(server.socket_addr(), "0.0.0.0:54321");
        assert_eq!(server.routes().len(), 1);
    }

    #[test]
    fn test_server_with_custom_port() {
        let server = HttpServer::new(HttpServerConfig::with_port(8080), Vec::new());
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds_with_any_origin() {
        let config = HttpServerConfig {
            cors_origins: Vec::new(),
            ..Default::default()
        };
        let _router = HttpServer::new(config, vec![product_route()]).router();
    }

    #[tokio::test]
    async fn test_bind_reports_address_in_use() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let config = HttpServerConfig {
            host: "127.0.0.1".into(),
            port,
            ..Default::default()
        };
        let server = HttpServer::new(config, Vec::new());

        assert!(server.bind().await.is_err());
    }

    #[tokio::test]
    async fn test_bind_rejects_bad_host() {
        let config = HttpServerConfig {
            host: "not a host".into(),
            ..Default::default()
        };
        let server = HttpServer::new(config, Vec::new());

        let err = server.bind().await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_from_config_inline_routes() {
        let mut config = HttpServerConfig::default();
        config.routes.push(super::super::RouteConfig {
            path: "/ping".into(),
            schema_file: None,
            schema: Some(Schema::new()),
        });

        let server = HttpServer::from_config(config).unwrap();
        assert_eq!(server.routes()[0].path, "/ping");
    }
}
