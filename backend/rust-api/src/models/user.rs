use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// User model stored in the single MongoDB "users" collection.
///
/// All three roles live in one collection with a `role` discriminator, so an
/// email or Google UID lookup is a single query and email uniqueness is
/// global. Role-specific fields are optional and only populated for the
/// matching role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    // Student fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default)]
    pub module_progress: HashMap<String, ModuleProgress>,
    #[serde(default)]
    pub drills_attended: i32,
    #[serde(default)]
    pub total_points: i64,

    // Staff fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub assigned_classes: Vec<String>,

    // Admin fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,

    #[serde(with = "super::bson_datetime_as_chrono")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "super::bson_datetime_as_chrono")]
    pub updated_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::bson_datetime_as_chrono_option"
    )]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Per-module learning progress, keyed by module id on the student document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::bson_datetime_as_chrono_option"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Staff,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Student => "student",
            UserRole::Staff => "staff",
            UserRole::Admin => "admin",
        }
    }

    /// Prefix for the generated human-readable id ("STU-A1B2C3" style).
    pub fn id_prefix(&self) -> &str {
        match self {
            UserRole::Student => "STU",
            UserRole::Staff => "STF",
            UserRole::Admin => "ADM",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

/// User representation returned to clients (password hash stripped).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub module_progress: HashMap<String, ModuleProgress>,
    pub drills_attended: i32,
    pub total_points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub assigned_classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            photo_url: user.photo_url,
            admission_no: user.admission_no,
            class: user.class,
            section: user.section,
            module_progress: user.module_progress,
            drills_attended: user.drills_attended,
            total_points: user.total_points,
            staff_id: user.staff_id,
            department: user.department,
            assigned_classes: user.assigned_classes,
            admin_id: user.admin_id,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Request to register a new user
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Optional role (defaults to student).
    pub role: Option<UserRole>,

    pub class: Option<String>,
    pub section: Option<String>,
    pub department: Option<String>,
}

/// Request to login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Request to exchange a Google ID token for an application session
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    #[validate(length(min = 1, message = "idToken is required"))]
    pub id_token: String,

    /// Role assigned on first federated login (defaults to student).
    pub role: Option<UserRole>,
}

/// Request body variant for token verification (token may also come from the
/// Authorization header).
#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    pub token: Option<String>,
}

/// Response after successful login or registration
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Request to create a student (admin/staff flow, no self-service password)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Class is required"))]
    pub class: String,

    pub section: Option<String>,

    /// Initial password; a default is assigned when omitted.
    pub password: Option<String>,
}

/// Request to update a student. Credential fields are deliberately absent so
/// they can never be smuggled through a profile update.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub class: Option<String>,
    pub section: Option<String>,
    pub status: Option<UserStatus>,
}

/// Query params for listing students
#[derive(Debug, Deserialize)]
pub struct ListStudentsQuery {
    pub search: Option<String>, // substring match on name or email
    pub class: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}
