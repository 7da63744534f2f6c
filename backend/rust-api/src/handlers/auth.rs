use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::extractors::AppJson;
use crate::handlers::ApiError;
use crate::middlewares::auth::{bearer_token, JwtService};
use crate::models::user::{GoogleLoginRequest, LoginRequest, RegisterRequest, VerifyRequest};
use crate::services::auth_service::AuthService;
use crate::services::{google_auth, AppState};

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        state.mongo.clone(),
        JwtService::new(&state.config.jwt_secret),
    )
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let response = auth_service(&state).register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "token": response.token,
            "user": response.user,
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let response = auth_service(&state)
        .login(req)
        .await
        .map_err(|e| match e.to_string() {
            m if m.contains("Invalid email or password") || m.contains("inactive") => {
                ApiError::Unauthorized(m)
            }
            _ => ApiError::from(e),
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": response.token,
        "user": response.user,
    })))
}

/// POST /api/auth/google-login
pub async fn google_login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<GoogleLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let info = google_auth::verify_id_token(
        &state.http,
        &state.config.google_client_id,
        &req.id_token,
    )
    .await
    .map_err(|e| {
        tracing::warn!("Google ID token verification failed: {}", e);
        ApiError::Unauthorized("Google sign-in could not be verified".to_string())
    })?;

    let response = auth_service(&state)
        .google_login(info, &req)
        .await
        .map_err(|e| match e.to_string() {
            m if m.contains("inactive") => ApiError::Unauthorized(m),
            _ => ApiError::from(e),
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": response.token,
        "user": response.user,
    })))
}

/// POST /api/auth/verify
///
/// The token is taken from the Authorization header when present, otherwise
/// from the request body. Plain `Json` here so a missing body becomes `None`
/// rather than a parse rejection.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<VerifyRequest>>,
) -> impl IntoResponse {
    let token = bearer_token(&headers)
        .map(|t| t.to_string())
        .or_else(|| body.and_then(|Json(req)| req.token));

    let Some(token) = token else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "valid": false,
                "message": "No token provided",
            })),
        );
    };

    match auth_service(&state).verify(&token).await {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "valid": true,
                "user": user,
            })),
        ),
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "valid": false,
                "message": e.to_string(),
            })),
        ),
    }
}
