use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::models::ai::{
    AnalyzePreparednessRequest, ChatRequest, DrillScenario, DrillScenarioRequest, EmergencyGuide,
    EmergencyGuideRequest, GeneratedQuizQuestion, PreparednessAnalysis, QuizRequest, SafetyTip,
    SafetyTipsRequest,
};
use crate::services::AppState;

/// Fixed system context prepended to every prompt.
const SYSTEM_CONTEXT: &str = "You are JAGRUK, a disaster-preparedness assistant for schools. \
You help students, staff and administrators prepare for earthquakes, fires, floods, cyclones \
and other emergencies. Keep answers factual, age-appropriate and focused on school safety.";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI API key is not configured")]
    MissingApiKey,

    #[error("AI provider request failed: {0}")]
    Upstream(String),

    #[error("Model response did not match the expected structure: {0}")]
    MalformedModelResponse(String),
}

lazy_static! {
    static ref JSON_ARRAY_RE: Regex = Regex::new(r"(?s)\[.*\]").unwrap();
    static ref JSON_OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Extract and validate a JSON array embedded in free-form model output.
pub fn extract_json_array<T: DeserializeOwned>(raw: &str) -> Result<T, AiError> {
    let matched = JSON_ARRAY_RE.find(raw).ok_or_else(|| {
        AiError::MalformedModelResponse("no JSON array found in model output".to_string())
    })?;
    serde_json::from_str(matched.as_str())
        .map_err(|e| AiError::MalformedModelResponse(e.to_string()))
}

/// Extract and validate a JSON object embedded in free-form model output.
pub fn extract_json_object<T: DeserializeOwned>(raw: &str) -> Result<T, AiError> {
    let matched = JSON_OBJECT_RE.find(raw).ok_or_else(|| {
        AiError::MalformedModelResponse("no JSON object found in model output".to_string())
    })?;
    serde_json::from_str(matched.as_str())
        .map_err(|e| AiError::MalformedModelResponse(e.to_string()))
}

pub struct AiService {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl AiService {
    pub fn new(state: &AppState) -> Self {
        Self {
            http: state.http.clone(),
            api_key: state.config.ai_api_key.clone(),
            api_url: state.config.ai_api_url.clone(),
        }
    }

    /// Free-form chat; the model reply is returned verbatim.
    pub async fn chat(&self, req: ChatRequest) -> Result<String, AiError> {
        let mut prompt = String::new();
        if let Some(context) = &req.context {
            prompt.push_str(&format!("Conversation so far:\n{}\n\n", context));
        }
        prompt.push_str(&format!("Student question: {}", req.message));

        self.generate(&prompt).await
    }

    pub async fn quiz(&self, req: QuizRequest) -> Result<Vec<GeneratedQuizQuestion>, AiError> {
        let count = req.count.unwrap_or(5);
        let difficulty = req.difficulty.as_deref().unwrap_or("medium");
        let prompt = format!(
            "Generate {count} {difficulty} multiple-choice quiz questions about \"{topic}\" \
             for school students. Respond with ONLY a JSON array where each element is \
             {{\"question\": string, \"options\": [string, string, string, string], \
             \"correctIndex\": number, \"explanation\": string}}.",
            count = count,
            difficulty = difficulty,
            topic = req.topic,
        );

        let raw = self.generate(&prompt).await?;
        extract_json_array(&raw)
    }

    pub async fn safety_tips(&self, req: SafetyTipsRequest) -> Result<Vec<SafetyTip>, AiError> {
        let count = req.count.unwrap_or(5);
        let prompt = format!(
            "List {count} practical safety tips for a school facing a {disaster} emergency. \
             Respond with ONLY a JSON array where each element is \
             {{\"title\": string, \"description\": string}}.",
            count = count,
            disaster = req.disaster_type,
        );

        let raw = self.generate(&prompt).await?;
        extract_json_array(&raw)
    }

    pub async fn drill_scenario(&self, req: DrillScenarioRequest) -> Result<DrillScenario, AiError> {
        let level = req.school_level.as_deref().unwrap_or("secondary");
        let prompt = format!(
            "Design a realistic {drill_type} drill scenario for a {level} school. \
             Respond with ONLY a JSON object of the form \
             {{\"title\": string, \"description\": string, \"steps\": [string], \
             \"durationMinutes\": number}}.",
            drill_type = req.drill_type,
            level = level,
        );

        let raw = self.generate(&prompt).await?;
        extract_json_object(&raw)
    }

    pub async fn analyze_preparedness(
        &self,
        req: AnalyzePreparednessRequest,
    ) -> Result<PreparednessAnalysis, AiError> {
        let prompt = format!(
            "A school reports these preparedness figures: {students} students, \
             {drills} drills completed, {modules} learning modules completed, \
             {alerts} active alerts. Assess their disaster preparedness. \
             Respond with ONLY a JSON object of the form \
             {{\"score\": number (0-100), \"strengths\": [string], \
             \"weaknesses\": [string], \"recommendations\": [string]}}.",
            students = req.total_students,
            drills = req.drills_completed,
            modules = req.modules_completed,
            alerts = req.active_alerts,
        );

        let raw = self.generate(&prompt).await?;
        extract_json_object(&raw)
    }

    pub async fn emergency_guide(
        &self,
        req: EmergencyGuideRequest,
    ) -> Result<EmergencyGuide, AiError> {
        let prompt = format!(
            "Write a concise emergency response guide for a {emergency} at a school. \
             Respond with ONLY a JSON object of the form \
             {{\"title\": string, \"immediateActions\": [string], \
             \"avoid\": [string], \"aftermath\": [string]}}.",
            emergency = req.emergency_type,
        );

        let raw = self.generate(&prompt).await?;
        extract_json_object(&raw)
    }

    /// Call the generative-AI completion endpoint and return the raw text of
    /// the first candidate.
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        if self.api_key.is_empty() {
            return Err(AiError::MissingApiKey);
        }

        let body = json!({
            "contents": [{
                "parts": [{ "text": format!("{}\n\n{}", SYSTEM_CONTEXT, prompt) }]
            }],
            "generationConfig": { "temperature": 0.7 }
        });

        let response = self
            .http
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AiError::Upstream(format!(
                "provider returned status {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::Upstream(e.to_string()))?;

        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AiError::Upstream("provider returned no candidates".to_string()))
    }
}
