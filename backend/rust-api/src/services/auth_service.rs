use crate::middlewares::auth::{JwtClaims, JwtService};
use crate::models::user::{
    AuthResponse, GoogleLoginRequest, LoginRequest, RegisterRequest, User, UserProfile, UserRole,
    UserStatus,
};
use crate::services::google_auth::GoogleTokenInfo;
use anyhow::{anyhow, Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Database;
use rand::{distr::Alphanumeric, Rng};
use std::collections::HashMap;

pub struct AuthService {
    mongo: Database,
    jwt_service: JwtService,
    token_ttl_seconds: i64,
}

impl AuthService {
    pub fn new(mongo: Database, jwt_service: JwtService) -> Self {
        // Session tokens default to 30 days, overridable via env
        let token_ttl_seconds = std::env::var("JWT_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(2_592_000);

        Self {
            mongo,
            jwt_service,
            token_ttl_seconds,
        }
    }

    /// Hash a password using bcrypt with cost 12
    pub fn hash_password(&self, password: &str) -> Result<String> {
        hash(password, DEFAULT_COST).context("Failed to hash password")
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        verify(password, hash).context("Failed to verify password")
    }

    /// Generate a human-readable role id such as "STU-4X8Q2Z"
    pub fn generate_role_id(role: &UserRole) -> String {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect::<String>()
            .to_uppercase();
        format!("{}-{}", role.id_prefix(), suffix)
    }

    /// Register a new user
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        let users_collection = self.mongo.collection::<User>("users");

        // Email uniqueness is global across all roles (single collection)
        let existing_user = users_collection
            .find_one(doc! { "email": &req.email })
            .await
            .context("Failed to check existing user")?;

        if existing_user.is_some() {
            return Err(anyhow!("This email is already registered"));
        }

        let password_hash = self.hash_password(&req.password)?;
        let role = req.role.unwrap_or_default();

        let now = Utc::now();
        let mut user = User {
            id: None, // MongoDB will generate
            name: req.name,
            email: req.email,
            password_hash,
            role,
            status: UserStatus::Active,
            google_uid: None,
            photo_url: None,
            admission_no: None,
            class: req.class,
            section: req.section,
            module_progress: HashMap::new(),
            drills_attended: 0,
            total_points: 0,
            staff_id: None,
            department: req.department,
            assigned_classes: Vec::new(),
            admin_id: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        let role_id = Self::generate_role_id(&role);
        match role {
            UserRole::Student => user.admission_no = Some(role_id),
            UserRole::Staff => user.staff_id = Some(role_id),
            UserRole::Admin => user.admin_id = Some(role_id),
        }

        let insert_result = users_collection
            .insert_one(&user)
            .await
            .context("Failed to insert user")?;

        let user_id = insert_result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| anyhow!("Failed to get inserted user ID"))?;

        user.id = Some(user_id);
        let token = self.generate_session_token(&user)?;

        Ok(AuthResponse {
            token,
            user: UserProfile::from(user),
        })
    }

    /// Login user with email and password
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let users_collection = self.mongo.collection::<User>("users");

        let user = users_collection
            .find_one(doc! { "email": &req.email })
            .await
            .context("Failed to query user")?
            .ok_or_else(|| anyhow!("Invalid email or password"))?;

        if user.status != UserStatus::Active {
            return Err(anyhow!("User account is inactive"));
        }

        if !self.verify_password(&req.password, &user.password_hash)? {
            tracing::warn!(email = %req.email, "Failed login attempt: invalid password");
            return Err(anyhow!("Invalid email or password"));
        }

        let user_id = user.id.ok_or_else(|| anyhow!("User ID not found"))?;

        users_collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "lastLoginAt": mongodb::bson::DateTime::now() } },
            )
            .await
            .context("Failed to update last login timestamp")?;

        let token = self.generate_session_token(&user)?;

        tracing::info!(
            user_id = %user_id.to_hex(),
            email = %req.email,
            "Successful login"
        );

        Ok(AuthResponse {
            token,
            user: UserProfile::from(user),
        })
    }

    /// Login (or first-time register) via a verified Google identity
    pub async fn google_login(
        &self,
        info: GoogleTokenInfo,
        req: &GoogleLoginRequest,
    ) -> Result<AuthResponse> {
        let users_collection = self.mongo.collection::<User>("users");

        // Prefer UID match, fall back to email so existing password accounts
        // get linked rather than duplicated
        let existing = match users_collection
            .find_one(doc! { "googleUid": &info.sub })
            .await
            .context("Failed to query user by Google UID")?
        {
            Some(user) => Some(user),
            None => users_collection
                .find_one(doc! { "email": &info.email })
                .await
                .context("Failed to query user by email")?,
        };

        let user = match existing {
            Some(user) => {
                if user.status != UserStatus::Active {
                    return Err(anyhow!("User account is inactive"));
                }
                let user_id = user.id.ok_or_else(|| anyhow!("User ID not found"))?;

                let mut update = doc! { "lastLoginAt": mongodb::bson::DateTime::now(),
                                        "googleUid": &info.sub };
                if let Some(picture) = &info.picture {
                    update.insert("photoUrl", picture);
                }

                users_collection
                    .update_one(doc! { "_id": user_id }, doc! { "$set": update })
                    .await
                    .context("Failed to update Google login data")?;

                users_collection
                    .find_one(doc! { "_id": user_id })
                    .await
                    .context("Failed to reload user")?
                    .ok_or_else(|| anyhow!("User not found after update"))?
            }
            None => {
                // First federated login: create a role-defaulted record with a
                // random local credential
                let role = req.role.unwrap_or_default();
                let random_password: String = rand::rng()
                    .sample_iter(&Alphanumeric)
                    .take(32)
                    .map(char::from)
                    .collect();
                let password_hash = self.hash_password(&random_password)?;

                let now = Utc::now();
                let mut user = User {
                    id: None,
                    name: info.name.clone().unwrap_or_else(|| info.email.clone()),
                    email: info.email.clone(),
                    password_hash,
                    role,
                    status: UserStatus::Active,
                    google_uid: Some(info.sub.clone()),
                    photo_url: info.picture.clone(),
                    admission_no: None,
                    class: None,
                    section: None,
                    module_progress: HashMap::new(),
                    drills_attended: 0,
                    total_points: 0,
                    staff_id: None,
                    department: None,
                    assigned_classes: Vec::new(),
                    admin_id: None,
                    created_at: now,
                    updated_at: now,
                    last_login_at: Some(now),
                };

                let role_id = Self::generate_role_id(&role);
                match role {
                    UserRole::Student => user.admission_no = Some(role_id),
                    UserRole::Staff => user.staff_id = Some(role_id),
                    UserRole::Admin => user.admin_id = Some(role_id),
                }

                let insert_result = users_collection
                    .insert_one(&user)
                    .await
                    .context("Failed to insert Google user")?;
                user.id = insert_result.inserted_id.as_object_id();
                user
            }
        };

        let token = self.generate_session_token(&user)?;

        Ok(AuthResponse {
            token,
            user: UserProfile::from(user),
        })
    }

    /// Validate a session token and re-fetch its user
    pub async fn verify(&self, token: &str) -> Result<UserProfile> {
        let claims = self
            .jwt_service
            .validate_token(token)
            .map_err(|e| anyhow!("{}", e))?;

        let user = self.get_user_by_id(&claims.sub).await?;
        Ok(UserProfile::from(user))
    }

    /// Get user by ID
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User> {
        let object_id = ObjectId::parse_str(user_id).context("Invalid user ID format")?;

        let collection = self.mongo.collection::<User>("users");
        collection
            .find_one(doc! { "_id": object_id })
            .await
            .context("Failed to query user")?
            .ok_or_else(|| anyhow!("User not found"))
    }

    /// Generate JWT session token for a user
    fn generate_session_token(&self, user: &User) -> Result<String> {
        let user_id = user.id.ok_or_else(|| anyhow!("User ID not found"))?;
        let now = Utc::now();
        let exp = now + Duration::seconds(self.token_ttl_seconds);

        let claims = JwtClaims {
            sub: user_id.to_hex(),
            role: user.role.as_str().to_string(),
            email: user.email.clone(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        self.jwt_service
            .generate_token(claims)
            .map_err(|e| anyhow!("Failed to generate token: {}", e))
    }
}
