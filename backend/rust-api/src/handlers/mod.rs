use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;
use serde_json::json;
use std::sync::Arc;

use crate::services::ai_service::AiError;
use crate::services::AppState;

pub mod ai;
pub mod alerts;
pub mod auth;
pub mod dashboard;
pub mod drills;
pub mod modules;
pub mod students;

/// Error type shared by all handlers. Rendered as the standard
/// `{ "success": false, "message": ... }` envelope.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

/// Classify service-layer errors by message. Services report domain failures
/// through anyhow, so the handler boundary decides the status code.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let message = err.to_string();
        if message.contains("not found") || message.contains("Not found") {
            ApiError::NotFound(message)
        } else if message.contains("Invalid")
            || message.contains("already registered")
            || message.contains("No fields to update")
            || message.contains("cannot move to")
            || message.contains("no longer active")
            || message.contains("inactive")
        {
            ApiError::BadRequest(message)
        } else {
            ApiError::Internal(message)
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(format!("Validation failed: {}", err))
    }
}

/// Health check endpoint reporting MongoDB connectivity.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mongo_ok = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        state.mongo.run_command(mongodb::bson::doc! { "ping": 1 }),
    )
    .await
    .map(|r| r.is_ok())
    .unwrap_or(false);

    let status = if mongo_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": (if mongo_ok { "healthy" } else { "degraded" }),
            "service": "jagruk-api",
            "version": env!("CARGO_PKG_VERSION"),
            "mongo": (if mongo_ok { "connected" } else { "unreachable" }),
        })),
    )
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler() -> Result<String, ApiError> {
    crate::metrics::render_metrics().map_err(|e| ApiError::Internal(e.to_string()))
}

/// Basic-auth gate for the metrics endpoint. Credentials come from the
/// METRICS_AUTH env var as "user:password".
pub async fn metrics_auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = std::env::var("METRICS_AUTH").unwrap_or_else(|_| "admin:changeme".to_string());

    let provided = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|encoded| {
            base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .ok()
        })
        .and_then(|bytes| String::from_utf8(bytes).ok());

    match provided {
        Some(credentials) if credentials == expected => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Fallback for unknown /api routes: a short description of the API surface.
pub async fn api_description() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Unknown API route",
            "service": "JAGRUK disaster-preparedness API",
            "resources": [
                "/api/auth",
                "/api/students",
                "/api/drills",
                "/api/modules",
                "/api/alerts",
                "/api/dashboard",
                "/api/ai",
            ],
        })),
    )
}
