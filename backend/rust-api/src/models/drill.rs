use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Drill document stored in the "drills" collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drill {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub drill_type: String,
    pub scheduled_for: bson::DateTime,
    pub duration_minutes: i32,
    #[serde(default)]
    pub target_classes: Vec<String>,
    pub status: DrillStatus,
    /// studentId (hex) -> attendance entry. Doubles as the idempotency record
    /// for point crediting.
    #[serde(default)]
    pub attendance: HashMap<String, AttendanceEntry>,
    #[serde(default)]
    pub participant_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrillStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl DrillStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DrillStatus::Scheduled => "scheduled",
            DrillStatus::InProgress => "in_progress",
            DrillStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub status: AttendanceStatus,
    pub marked_at: bson::DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// Client-facing drill view with hex ids and RFC 3339 timestamps.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillView {
    pub id: String,
    pub title: String,
    pub drill_type: String,
    pub scheduled_for: String,
    pub duration_minutes: i32,
    pub target_classes: Vec<String>,
    pub status: DrillStatus,
    pub attendance: HashMap<String, AttendanceEntryView>,
    pub participant_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntryView {
    pub status: AttendanceStatus,
    pub marked_at: String,
}

impl From<Drill> for DrillView {
    fn from(drill: Drill) -> Self {
        DrillView {
            id: drill.id.to_hex(),
            title: drill.title,
            drill_type: drill.drill_type,
            scheduled_for: super::to_rfc3339(&drill.scheduled_for),
            duration_minutes: drill.duration_minutes,
            target_classes: drill.target_classes,
            status: drill.status,
            attendance: drill
                .attendance
                .into_iter()
                .map(|(student_id, entry)| {
                    (
                        student_id,
                        AttendanceEntryView {
                            status: entry.status,
                            marked_at: super::to_rfc3339(&entry.marked_at),
                        },
                    )
                })
                .collect(),
            participant_count: drill.participant_count,
            created_by: drill.created_by,
            created_at: super::to_rfc3339(&drill.created_at),
            updated_at: super::to_rfc3339(&drill.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDrillRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Drill type is required"))]
    pub drill_type: String,

    pub scheduled_for: DateTime<Utc>,

    #[validate(range(min = 1, max = 480, message = "Duration must be 1-480 minutes"))]
    pub duration_minutes: Option<i32>,

    #[serde(default)]
    pub target_classes: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDrillRequest {
    #[validate(length(min = 1, max = 200, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub drill_type: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 480, message = "Duration must be 1-480 minutes"))]
    pub duration_minutes: Option<i32>,
    pub target_classes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    #[validate(length(min = 1, message = "studentId is required"))]
    pub student_id: String,

    pub status: AttendanceStatus,
}
