use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::handlers::ApiError;
use crate::services::dashboard_service::DashboardService;
use crate::services::AppState;

/// GET /api/dashboard/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let stats = DashboardService::new(state.mongo.clone()).stats().await?;

    Ok(Json(json!({
        "success": true,
        "stats": stats,
    })))
}

/// GET /api/dashboard/leaderboard
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let leaderboard = DashboardService::new(state.mongo.clone())
        .leaderboard()
        .await?;

    Ok(Json(json!({
        "success": true,
        "leaderboard": leaderboard,
    })))
}

/// GET /api/dashboard/activities
pub async fn activities(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let activities = DashboardService::new(state.mongo.clone())
        .activities()
        .await?;

    Ok(Json(json!({
        "success": true,
        "activities": activities,
    })))
}
