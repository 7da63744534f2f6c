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
use crate::models::user::{CreateStudentRequest, ListStudentsQuery, UpdateStudentRequest};
use crate::services::student_service::StudentService;
use crate::services::AppState;

/// GET /api/students
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListStudentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let students = StudentService::new(state.mongo.clone()).list(query).await?;

    Ok(Json(json!({
        "success": true,
        "count": students.len(),
        "students": students,
    })))
}

/// GET /api/students/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let student = StudentService::new(state.mongo.clone()).get(&id).await?;

    Ok(Json(json!({
        "success": true,
        "student": student,
    })))
}

/// POST /api/students
pub async fn create(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let student = StudentService::new(state.mongo.clone()).create(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Student created",
            "student": student,
        })),
    ))
}

/// PUT /api/students/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let student = StudentService::new(state.mongo.clone())
        .update(&id, req)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Student updated",
        "student": student,
    })))
}

/// DELETE /api/students/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    StudentService::new(state.mongo.clone()).delete(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Student deleted",
    })))
}
