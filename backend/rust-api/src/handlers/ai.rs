use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::extractors::AppJson;
use crate::handlers::ApiError;
use crate::metrics::AI_REQUESTS_TOTAL;
use crate::models::ai::{
    AnalyzePreparednessRequest, ChatRequest, DrillScenarioRequest, EmergencyGuideRequest,
    QuizRequest, SafetyTipsRequest,
};
use crate::services::ai_service::{AiError, AiService};
use crate::services::AppState;

fn record<T>(action: &str, result: &Result<T, AiError>) {
    let status = if result.is_ok() { "ok" } else { "error" };
    AI_REQUESTS_TOTAL.with_label_values(&[action, status]).inc();
}

/// POST /api/ai/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let result = AiService::new(&state).chat(req).await;
    record("chat", &result);
    let reply = result?;

    Ok(Json(json!({
        "success": true,
        "reply": reply,
    })))
}

/// POST /api/ai/quiz
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<QuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let result = AiService::new(&state).quiz(req).await;
    record("generate_quiz", &result);
    let questions = result?;

    Ok(Json(json!({
        "success": true,
        "count": questions.len(),
        "questions": questions,
    })))
}

/// POST /api/ai/safety-tips
pub async fn safety_tips(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SafetyTipsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let result = AiService::new(&state).safety_tips(req).await;
    record("safety_tips", &result);
    let tips = result?;

    Ok(Json(json!({
        "success": true,
        "count": tips.len(),
        "tips": tips,
    })))
}

/// POST /api/ai/drill-scenario
pub async fn drill_scenario(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<DrillScenarioRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let result = AiService::new(&state).drill_scenario(req).await;
    record("drill_scenario", &result);
    let scenario = result?;

    Ok(Json(json!({
        "success": true,
        "scenario": scenario,
    })))
}

/// POST /api/ai/analyze-preparedness
pub async fn analyze_preparedness(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AnalyzePreparednessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let result = AiService::new(&state).analyze_preparedness(req).await;
    record("analyze_preparedness", &result);
    let analysis = result?;

    Ok(Json(json!({
        "success": true,
        "analysis": analysis,
    })))
}

/// POST /api/ai/emergency-guide
pub async fn emergency_guide(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<EmergencyGuideRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let result = AiService::new(&state).emergency_guide(req).await;
    record("emergency_guide", &result);
    let guide = result?;

    Ok(Json(json!({
        "success": true,
        "guide": guide,
    })))
}
