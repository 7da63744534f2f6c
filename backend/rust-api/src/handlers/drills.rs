use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::extractors::AppJson;
use crate::handlers::ApiError;
use crate::metrics::DRILL_ATTENDANCE_TOTAL;
use crate::models::drill::{
    AttendanceRequest, AttendanceStatus, CreateDrillRequest, DrillView, UpdateDrillRequest,
};
use crate::services::drill_service::DrillService;
use crate::services::AppState;

/// GET /api/drills
pub async fn list(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let drills = DrillService::new(state.mongo.clone()).list().await?;
    let views: Vec<DrillView> = drills.into_iter().map(DrillView::from).collect();

    Ok(Json(json!({
        "success": true,
        "count": views.len(),
        "drills": views,
    })))
}

/// GET /api/drills/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let drill = DrillService::new(state.mongo.clone()).get(&id).await?;

    Ok(Json(json!({
        "success": true,
        "drill": DrillView::from(drill),
    })))
}

/// POST /api/drills
pub async fn create(
    State(state): State<Arc<AppState>>,
    claims: axum::Extension<crate::middlewares::auth::JwtClaims>,
    AppJson(req): AppJson<CreateDrillRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let drill = DrillService::new(state.mongo.clone())
        .create(req, Some(claims.sub.clone()))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Drill scheduled",
            "drill": DrillView::from(drill),
        })),
    ))
}

/// PUT /api/drills/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateDrillRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let drill = DrillService::new(state.mongo.clone())
        .update(&id, req)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Drill updated",
        "drill": DrillView::from(drill),
    })))
}

/// DELETE /api/drills/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    DrillService::new(state.mongo.clone()).delete(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Drill deleted",
    })))
}

/// POST /api/drills/{id}/start
pub async fn start(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let drill = DrillService::new(state.mongo.clone()).start(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Drill started",
        "drill": DrillView::from(drill),
    })))
}

/// POST /api/drills/{id}/end
pub async fn end(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let drill = DrillService::new(state.mongo.clone()).end(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Drill completed",
        "drill": DrillView::from(drill),
    })))
}

/// POST /api/drills/{id}/attendance
pub async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AttendanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let status_label = match req.status {
        AttendanceStatus::Present => "present",
        AttendanceStatus::Absent => "absent",
    };

    let drill = DrillService::new(state.mongo.clone())
        .mark_attendance(&id, req)
        .await?;

    DRILL_ATTENDANCE_TOTAL
        .with_label_values(&[status_label])
        .inc();

    Ok(Json(json!({
        "success": true,
        "message": "Attendance recorded",
        "drill": DrillView::from(drill),
    })))
}
