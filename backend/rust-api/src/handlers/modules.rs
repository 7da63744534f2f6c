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
use crate::models::module::{
    CreateModuleRequest, ModuleView, ProgressRequest, UpdateModuleRequest,
};
use crate::services::module_service::ModuleService;
use crate::services::AppState;

/// GET /api/modules
pub async fn list(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let modules = ModuleService::new(state.mongo.clone()).list_active().await?;
    let views: Vec<ModuleView> = modules.into_iter().map(ModuleView::from).collect();

    Ok(Json(json!({
        "success": true,
        "count": views.len(),
        "modules": views,
    })))
}

/// GET /api/modules/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let module = ModuleService::new(state.mongo.clone()).get(&id).await?;

    Ok(Json(json!({
        "success": true,
        "module": ModuleView::from(module),
    })))
}

/// POST /api/modules
pub async fn create(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateModuleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let module = ModuleService::new(state.mongo.clone()).create(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Module created",
            "module": ModuleView::from(module),
        })),
    ))
}

/// PUT /api/modules/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateModuleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let module = ModuleService::new(state.mongo.clone())
        .update(&id, req)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Module updated",
        "module": ModuleView::from(module),
    })))
}

/// DELETE /api/modules/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ModuleService::new(state.mongo.clone()).delete(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Module deleted",
    })))
}

/// POST /api/modules/{id}/progress
pub async fn record_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<ProgressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let outcome = ModuleService::new(state.mongo.clone())
        .record_progress(&id, req)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Progress recorded",
        "progress": outcome,
    })))
}
