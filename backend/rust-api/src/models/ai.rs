use serde::{Deserialize, Serialize};
use validator::Validate;

// Request DTOs for the AI proxy actions.

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000, message = "Message is required"))]
    pub message: String,

    /// Optional conversational context carried by the client.
    pub context: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuizRequest {
    #[validate(length(min = 1, max = 100, message = "Topic is required"))]
    pub topic: String,

    #[validate(range(min = 1, max = 20, message = "Count must be 1-20"))]
    pub count: Option<u32>,

    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SafetyTipsRequest {
    #[validate(length(min = 1, max = 100, message = "Disaster type is required"))]
    pub disaster_type: String,

    #[validate(range(min = 1, max = 15, message = "Count must be 1-15"))]
    pub count: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DrillScenarioRequest {
    #[validate(length(min = 1, max = 100, message = "Drill type is required"))]
    pub drill_type: String,

    pub school_level: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePreparednessRequest {
    #[validate(range(min = 0, message = "totalStudents must be non-negative"))]
    pub total_students: i64,
    #[validate(range(min = 0, message = "drillsCompleted must be non-negative"))]
    pub drills_completed: i64,
    #[validate(range(min = 0, message = "modulesCompleted must be non-negative"))]
    pub modules_completed: i64,
    #[validate(range(min = 0, message = "activeAlerts must be non-negative"))]
    pub active_alerts: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyGuideRequest {
    #[validate(length(min = 1, max = 100, message = "Emergency type is required"))]
    pub emergency_type: String,
}

// Typed schemas the model output is validated against. A response that does
// not deserialize into these is rejected as MalformedModelResponse instead of
// being passed through half-parsed.

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyTip {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillScenario {
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparednessAnalysis {
    pub score: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyGuide {
    pub title: String,
    pub immediate_actions: Vec<String>,
    pub avoid: Vec<String>,
    pub aftermath: Vec<String>,
}
