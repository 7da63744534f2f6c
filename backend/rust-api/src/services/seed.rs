use anyhow::{Context, Result};
use bcrypt::{hash, DEFAULT_COST};
use mongodb::bson::doc;
use mongodb::Database;

use crate::config::Config;
use crate::models::user::User;

/// Ensure the bootstrap admin account exists.
///
/// Uses an upsert with `$setOnInsert` so a concurrent start of multiple
/// instances still yields exactly one admin, and an existing admin's
/// password is never overwritten on restart.
pub async fn bootstrap(config: &Config, mongo: &Database) -> Result<()> {
    let users = mongo.collection::<User>("users");

    let password_hash =
        hash(&config.seed_admin_password, DEFAULT_COST).context("Failed to hash admin password")?;

    let now = mongodb::bson::DateTime::now();
    let result = users
        .update_one(
            doc! { "email": &config.seed_admin_email },
            doc! { "$setOnInsert": {
                "name": "JAGRUK Admin",
                "email": &config.seed_admin_email,
                "passwordHash": password_hash,
                "role": "admin",
                "status": "active",
                "adminId": "ADM-SEED01",
                "moduleProgress": {},
                "drillsAttended": 0,
                "totalPoints": 0,
                "assignedClasses": [],
                "createdAt": now,
                "updatedAt": now,
            } },
        )
        .upsert(true)
        .await
        .context("Failed to seed admin user")?;

    if result.upserted_id.is_some() {
        tracing::info!(email = %config.seed_admin_email, "Seeded bootstrap admin account");
    } else {
        tracing::debug!(email = %config.seed_admin_email, "Bootstrap admin already present");
    }

    Ok(())
}
