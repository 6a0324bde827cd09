//! # Param Normalizer Middleware
//!
//! Runs the request body through the normalizer before the handler sees it.
//!
//! - valid params: the body is replaced with the processed params and the
//!   request continues down the chain
//! - invalid params: the chain stops with `400 {"message": "<errors joined by \"; \n\">"}`
//!
//! An empty body or a JSON `null` body counts as an empty record.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::normalizer::{normalize, Schema};
use crate::observability::{log_event_with_fields, Event};

/// Rejections produced by the middleware
#[derive(Debug, Clone, Error)]
pub enum NormalizeRejection {
    /// Params failed validation; carries the joined error messages
    #[error("{0}")]
    InvalidParams(String),

    /// Body is not a JSON object
    #[error("{0}")]
    InvalidBody(String),

    /// Body exceeds the configured limit
    #[error("Request body exceeds {0} bytes")]
    TooLarge(usize),

    /// Processed params could not be re-encoded
    #[error("Failed to encode processed params: {0}")]
    Internal(String),
}

impl NormalizeRejection {
    /// Get HTTP status code for this rejection
    pub fn status_code(&self) -> StatusCode {
        match self {
            NormalizeRejection::InvalidParams(_) | NormalizeRejection::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            NormalizeRejection::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            NormalizeRejection::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Rejection response body
#[derive(Debug, Serialize)]
pub struct RejectionBody {
    pub message: String,
}

impl IntoResponse for NormalizeRejection {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(RejectionBody {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// State shared by every request of one guarded route
#[derive(Debug, Clone)]
pub struct NormalizerState {
    schema: Arc<Schema>,
    body_limit: usize,
}

impl NormalizerState {
    /// Default body limit: 1 MiB
    pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            body_limit: Self::DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// Middleware function, mount with `axum::middleware::from_fn_with_state`.
pub async fn normalize_body(
    State(state): State<NormalizerState>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let path = request.uri().path().to_string();

    match normalize_request(&state, request, &request_id, &path).await {
        Ok(request) => next.run(request).await,
        Err(rejection) => {
            let event = match rejection {
                NormalizeRejection::InvalidParams(_) => Event::ParamsRejected,
                _ => Event::BodyRejected,
            };
            let message = rejection.to_string();
            log_event_with_fields(
                event,
                &[
                    ("request_id", request_id.as_str()),
                    ("path", path.as_str()),
                    ("message", message.as_str()),
                ],
            );
            rejection.into_response()
        }
    }
}

async fn normalize_request(
    state: &NormalizerState,
    request: Request,
    request_id: &str,
    path: &str,
) -> Result<Request, NormalizeRejection> {
    let (mut parts, body) = request.into_parts();

    let declared_len = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_len.is_some_and(|len| len > state.body_limit) {
        return Err(NormalizeRejection::TooLarge(state.body_limit));
    }

    let bytes = read_body(body, state.body_limit).await?;
    let params = parse_params(&bytes)?;

    let result = normalize(&params, &state.schema);
    if !result.is_valid() {
        return Err(NormalizeRejection::InvalidParams(result.validated.message()));
    }

    let encoded = serde_json::to_vec(&result.processed)
        .map_err(|e| NormalizeRejection::Internal(e.to_string()))?;

    let fields = result.processed.len().to_string();
    log_event_with_fields(
        Event::ParamsNormalized,
        &[("request_id", request_id), ("path", path), ("fields", fields.as_str())],
    );

    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    parts
        .headers
        .insert(CONTENT_LENGTH, HeaderValue::from(encoded.len()));

    Ok(Request::from_parts(parts, Body::from(encoded)))
}

/// Collects the body, refusing anything past `limit` bytes.
///
/// Only the limit maps to 413; a broken body stream is an invalid body.
pub async fn read_body(body: Body, limit: usize) -> Result<Vec<u8>, NormalizeRejection> {
    let mut stream = body.into_data_stream();
    let mut bytes = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            NormalizeRejection::InvalidBody(format!("Failed to read request body: {}", e))
        })?;
        if bytes.len() + chunk.len() > limit {
            return Err(NormalizeRejection::TooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

/// Reads a request body as a params record.
pub fn parse_params(bytes: &[u8]) -> Result<Map<String, Value>, NormalizeRejection> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        NormalizeRejection::InvalidBody(format!("Request body is not valid JSON: {}", e))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(NormalizeRejection::InvalidBody(
            "Request body must be a JSON object".to_string(),
        )),
    }
}
