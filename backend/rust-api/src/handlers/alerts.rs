use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::extractors::AppJson;
use crate::handlers::ApiError;
use crate::metrics::ALERT_ACKNOWLEDGMENTS_TOTAL;
use crate::models::alert::{
    AcknowledgeRequest, AlertView, CreateAlertRequest, ListAlertsQuery, UpdateAlertRequest,
};
use crate::services::alert_service::AlertService;
use crate::services::AppState;

/// GET /api/alerts
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAlertsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let alerts = AlertService::new(state.mongo.clone()).list(query).await?;
    let views: Vec<AlertView> = alerts.into_iter().map(AlertView::from).collect();

    Ok(Json(json!({
        "success": true,
        "count": views.len(),
        "alerts": views,
    })))
}

/// GET /api/alerts/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let alert = AlertService::new(state.mongo.clone()).get(&id).await?;

    Ok(Json(json!({
        "success": true,
        "alert": AlertView::from(alert),
    })))
}

/// POST /api/alerts
pub async fn create(
    State(state): State<Arc<AppState>>,
    claims: axum::Extension<crate::middlewares::auth::JwtClaims>,
    AppJson(req): AppJson<CreateAlertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let alert = AlertService::new(state.mongo.clone())
        .create(req, Some(claims.sub.clone()))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Alert broadcast",
            "alert": AlertView::from(alert),
        })),
    ))
}

/// PUT /api/alerts/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateAlertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let alert = AlertService::new(state.mongo.clone())
        .update(&id, req)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Alert updated",
        "alert": AlertView::from(alert),
    })))
}

/// DELETE /api/alerts/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    AlertService::new(state.mongo.clone()).delete(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Alert deleted",
    })))
}

/// POST /api/alerts/{id}/acknowledge
pub async fn acknowledge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AcknowledgeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let result = AlertService::new(state.mongo.clone())
        .acknowledge(&id, req)
        .await;

    match result {
        Ok(alert) => {
            ALERT_ACKNOWLEDGMENTS_TOTAL
                .with_label_values(&["accepted"])
                .inc();
            Ok(Json(json!({
                "success": true,
                "message": "Alert acknowledged",
                "alert": AlertView::from(alert),
            })))
        }
        Err(e) => {
            ALERT_ACKNOWLEDGMENTS_TOTAL
                .with_label_values(&["rejected"])
                .inc();
            Err(ApiError::from(e))
        }
    }
}

/// POST /api/alerts/{id}/deactivate
pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let alert = AlertService::new(state.mongo.clone()).deactivate(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Alert deactivated",
        "alert": AlertView::from(alert),
    })))
}
