//! HTTP Routes
//!
//! - `GET /health` - liveness
//! - `GET /schemas` - schema of every guarded route
//! - `POST <route>` - guarded by the param normalizer, echoes the processed params

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};

use super::config::ResolvedRoute;
use super::middleware::{normalize_body, NormalizerState};
use crate::normalizer::Schema;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Response of a guarded route
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub params: Map<String, Value>,
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

/// Listing of guarded routes and their schemas
pub fn schema_routes(routes: &[ResolvedRoute]) -> Router {
    let listing: Arc<Vec<(String, Arc<Schema>)>> = Arc::new(
        routes
            .iter()
            .map(|r| (r.path.clone(), r.schema.clone()))
            .collect(),
    );

    Router::new()
        .route("/schemas", get(schemas_handler))
        .with_state(listing)
}

/// `POST <path>` behind the normalizer
pub fn guarded_route(route: &ResolvedRoute, body_limit: usize) -> Router {
    let state = NormalizerState::new(route.schema.clone()).with_body_limit(body_limit);

    Router::new().route(
        &route.path,
        post(accept_handler).layer(from_fn_with_state(state, normalize_body)),
    )
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn schemas_handler(
    State(listing): State<Arc<Vec<(String, Arc<Schema>)>>>,
) -> impl IntoResponse {
    let mut body = Map::new();
    for (path, schema) in listing.iter() {
        let schema = serde_json::to_value(schema.as_ref()).unwrap_or(Value::Null);
        body.insert(path.clone(), schema);
    }
    (StatusCode::OK, Json(Value::Object(body)))
}

/// The body has already been replaced with the processed params.
async fn accept_handler(Json(params): Json<Map<String, Value>>) -> impl IntoResponse {
    (StatusCode::OK, Json(AcceptedResponse { params }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"version\":\"0.1.0\""));
    }

    #[test]
    fn test_accepted_response_shape() {
        let mut params = Map::new();
        params.insert("price".into(), Value::from(19.99));

        let json = serde_json::to_value(AcceptedResponse { params }).unwrap();
        assert_eq!(json["params"]["price"], 19.99);
    }
}
