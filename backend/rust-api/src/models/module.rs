use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Learning module document stored in the "modules" collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningModule {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub sections: Vec<ModuleSection>,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
    pub points: i64,
    pub is_active: bool,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub sections: Vec<ModuleSection>,
    pub quiz: Vec<QuizQuestion>,
    pub points: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<LearningModule> for ModuleView {
    fn from(module: LearningModule) -> Self {
        ModuleView {
            id: module.id.to_hex(),
            title: module.title,
            description: module.description,
            category: module.category,
            sections: module.sections,
            quiz: module.quiz,
            points: module.points,
            is_active: module.is_active,
            created_at: super::to_rfc3339(&module.created_at),
            updated_at: super::to_rfc3339(&module.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateModuleRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub category: Option<String>,
    #[serde(default)]
    pub sections: Vec<ModuleSection>,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,

    #[validate(range(min = 1, max = 1000, message = "Points must be 1-1000"))]
    pub points: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModuleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sections: Option<Vec<ModuleSection>>,
    pub quiz: Option<Vec<QuizQuestion>>,
    #[validate(range(min = 1, max = 1000, message = "Points must be 1-1000"))]
    pub points: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    #[validate(length(min = 1, message = "studentId is required"))]
    pub student_id: String,

    pub completed: bool,

    #[validate(range(min = 0, max = 100, message = "Score must be 0-100"))]
    pub score: Option<i32>,
}

/// Outcome of a progress update, reporting whether points were credited.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOutcome {
    pub module_id: String,
    pub student_id: String,
    pub completed: bool,
    pub points_awarded: i64,
    pub total_points: i64,
}
