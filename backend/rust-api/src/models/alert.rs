use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Alert document stored in the "alerts" collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub message: String,
    pub alert_type: String,
    pub priority: AlertPriority,
    pub audience: String,
    pub is_active: bool,
    /// userId (hex) -> acknowledgment entry.
    #[serde(default)]
    pub acknowledgments: HashMap<String, Acknowledgment>,
    #[serde(default)]
    pub ack_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<bson::DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgment {
    pub name: String,
    pub acknowledged_at: bson::DateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertView {
    pub id: String,
    pub title: String,
    pub message: String,
    pub alert_type: String,
    pub priority: AlertPriority,
    pub audience: String,
    pub is_active: bool,
    pub acknowledgments: HashMap<String, AcknowledgmentView>,
    pub ack_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgmentView {
    pub name: String,
    pub acknowledged_at: String,
}

impl From<Alert> for AlertView {
    fn from(alert: Alert) -> Self {
        AlertView {
            id: alert.id.to_hex(),
            title: alert.title,
            message: alert.message,
            alert_type: alert.alert_type,
            priority: alert.priority,
            audience: alert.audience,
            is_active: alert.is_active,
            acknowledgments: alert
                .acknowledgments
                .into_iter()
                .map(|(user_id, ack)| {
                    (
                        user_id,
                        AcknowledgmentView {
                            name: ack.name,
                            acknowledged_at: super::to_rfc3339(&ack.acknowledged_at),
                        },
                    )
                })
                .collect(),
            ack_count: alert.ack_count,
            expires_at: alert.expires_at.as_ref().map(super::to_rfc3339),
            created_by: alert.created_by,
            created_at: super::to_rfc3339(&alert.created_at),
            updated_at: super::to_rfc3339(&alert.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,

    #[validate(length(min = 1, message = "Alert type is required"))]
    pub alert_type: String,

    pub priority: Option<AlertPriority>,
    pub audience: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRequest {
    #[validate(length(min = 1, max = 200, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub message: Option<String>,
    pub alert_type: Option<String>,
    pub priority: Option<AlertPriority>,
    pub audience: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Query params for listing alerts
#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    pub active: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}
