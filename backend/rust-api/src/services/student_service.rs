use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Database;

use crate::models::user::{
    CreateStudentRequest, ListStudentsQuery, UpdateStudentRequest, User, UserProfile, UserRole,
    UserStatus,
};
use crate::services::auth_service::AuthService;

const DEFAULT_STUDENT_PASSWORD: &str = "jagruk123";

pub struct StudentService {
    mongo: Database,
}

impl StudentService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    pub async fn list(&self, query: ListStudentsQuery) -> Result<Vec<UserProfile>> {
        let collection = self.mongo.collection::<User>("users");

        let mut filter = doc! { "role": "student" };

        if let Some(class) = &query.class {
            filter.insert("class", class);
        }

        if let Some(search) = &query.search {
            filter.insert(
                "$or",
                vec![
                    doc! { "name": { "$regex": search, "$options": "i" } },
                    doc! { "email": { "$regex": search, "$options": "i" } },
                ],
            );
        }

        let limit = query.limit.unwrap_or(50).min(100) as i64;
        let offset = query.offset.unwrap_or(0) as u64;

        let mut cursor = collection
            .find(filter)
            .sort(doc! { "name": 1 })
            .limit(limit)
            .skip(offset)
            .await
            .context("Failed to query students")?;

        let mut students = Vec::new();
        while let Some(user) = cursor
            .try_next()
            .await
            .context("Failed to read student from cursor")?
        {
            students.push(UserProfile::from(user));
        }

        Ok(students)
    }

    pub async fn get(&self, student_id: &str) -> Result<UserProfile> {
        let object_id = ObjectId::parse_str(student_id).context("Invalid student ID format")?;

        let collection = self.mongo.collection::<User>("users");
        let user = collection
            .find_one(doc! { "_id": object_id, "role": "student" })
            .await
            .context("Failed to query student")?
            .ok_or_else(|| anyhow!("Student not found"))?;

        Ok(UserProfile::from(user))
    }

    pub async fn create(&self, req: CreateStudentRequest) -> Result<UserProfile> {
        let collection = self.mongo.collection::<User>("users");

        let existing = collection
            .find_one(doc! { "email": &req.email })
            .await
            .context("Failed to check existing email")?;
        if existing.is_some() {
            return Err(anyhow!("This email is already registered"));
        }

        let password = req
            .password
            .unwrap_or_else(|| DEFAULT_STUDENT_PASSWORD.to_string());
        let password_hash =
            bcrypt::hash(&password, bcrypt::DEFAULT_COST).context("Failed to hash password")?;

        let now = Utc::now();
        let mut user = User {
            id: None,
            name: req.name,
            email: req.email,
            password_hash,
            role: UserRole::Student,
            status: UserStatus::Active,
            google_uid: None,
            photo_url: None,
            admission_no: Some(AuthService::generate_role_id(&UserRole::Student)),
            class: Some(req.class),
            section: req.section,
            module_progress: Default::default(),
            drills_attended: 0,
            total_points: 0,
            staff_id: None,
            department: None,
            assigned_classes: Vec::new(),
            admin_id: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        let insert_result = collection
            .insert_one(&user)
            .await
            .context("Failed to insert student")?;
        user.id = insert_result.inserted_id.as_object_id();

        Ok(UserProfile::from(user))
    }

    /// Merge the provided fields into the student document. Credential fields
    /// can never pass through here: the update document is built from an
    /// explicit whitelist.
    pub async fn update(&self, student_id: &str, req: UpdateStudentRequest) -> Result<UserProfile> {
        let object_id = ObjectId::parse_str(student_id).context("Invalid student ID format")?;

        let mut update_fields = Document::new();
        if let Some(name) = &req.name {
            update_fields.insert("name", name);
        }
        if let Some(email) = &req.email {
            update_fields.insert("email", email);
        }
        if let Some(class) = &req.class {
            update_fields.insert("class", class);
        }
        if let Some(section) = &req.section {
            update_fields.insert("section", section);
        }
        if let Some(status) = &req.status {
            update_fields.insert(
                "status",
                mongodb::bson::to_bson(status).context("Failed to encode status")?,
            );
        }
        update_fields.insert("updatedAt", mongodb::bson::DateTime::now());

        if update_fields.len() <= 1 {
            return Err(anyhow!("No fields to update"));
        }

        let collection = self.mongo.collection::<User>("users");
        let result = collection
            .update_one(
                doc! { "_id": object_id, "role": "student" },
                doc! { "$set": update_fields },
            )
            .await
            .context("Failed to update student")?;

        if result.matched_count == 0 {
            return Err(anyhow!("Student not found"));
        }

        self.get(student_id).await
    }

    pub async fn delete(&self, student_id: &str) -> Result<()> {
        let object_id = ObjectId::parse_str(student_id).context("Invalid student ID format")?;

        let collection = self.mongo.collection::<User>("users");
        let result = collection
            .delete_one(doc! { "_id": object_id, "role": "student" })
            .await
            .context("Failed to delete student")?;

        if result.deleted_count == 0 {
            return Err(anyhow!("Student not found"));
        }

        Ok(())
    }
}
