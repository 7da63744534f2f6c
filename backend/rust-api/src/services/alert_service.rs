use anyhow::{anyhow, Context, Result};
use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::Database;

use crate::models::alert::{
    Acknowledgment, AcknowledgeRequest, Alert, CreateAlertRequest, ListAlertsQuery,
    UpdateAlertRequest,
};

pub struct AlertService {
    mongo: Database,
}

impl AlertService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    pub async fn list(&self, query: ListAlertsQuery) -> Result<Vec<Alert>> {
        let collection = self.mongo.collection::<Alert>("alerts");

        let mut filter = doc! {};
        if let Some(active) = query.active {
            filter.insert("isActive", active);
        }

        let limit = query.limit.unwrap_or(50).min(100) as i64;
        let offset = query.offset.unwrap_or(0) as u64;

        let mut cursor = collection
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .skip(offset)
            .await
            .context("Failed to query alerts")?;

        let mut alerts = Vec::new();
        while let Some(alert) = cursor
            .try_next()
            .await
            .context("Failed to read alert from cursor")?
        {
            alerts.push(alert);
        }

        Ok(alerts)
    }

    pub async fn get(&self, alert_id: &str) -> Result<Alert> {
        let object_id = ObjectId::parse_str(alert_id).context("Invalid alert ID format")?;

        let collection = self.mongo.collection::<Alert>("alerts");
        collection
            .find_one(doc! { "_id": object_id })
            .await
            .context("Failed to query alert")?
            .ok_or_else(|| anyhow!("Alert not found"))
    }

    pub async fn create(&self, req: CreateAlertRequest, created_by: Option<String>) -> Result<Alert> {
        let collection = self.mongo.collection::<Alert>("alerts");

        let now = bson::DateTime::now();
        let alert = Alert {
            id: ObjectId::new(),
            title: req.title,
            message: req.message,
            alert_type: req.alert_type,
            priority: req.priority.unwrap_or_default(),
            audience: req.audience.unwrap_or_else(|| "all".to_string()),
            is_active: true,
            acknowledgments: Default::default(),
            ack_count: 0,
            expires_at: req
                .expires_at
                .map(|dt| bson::DateTime::from_millis(dt.timestamp_millis())),
            created_by,
            created_at: now,
            updated_at: now,
        };

        collection
            .insert_one(&alert)
            .await
            .context("Failed to insert alert")?;

        Ok(alert)
    }

    pub async fn update(&self, alert_id: &str, req: UpdateAlertRequest) -> Result<Alert> {
        let object_id = ObjectId::parse_str(alert_id).context("Invalid alert ID format")?;

        let mut update_fields = Document::new();
        if let Some(title) = &req.title {
            update_fields.insert("title", title);
        }
        if let Some(message) = &req.message {
            update_fields.insert("message", message);
        }
        if let Some(alert_type) = &req.alert_type {
            update_fields.insert("alertType", alert_type);
        }
        if let Some(priority) = &req.priority {
            update_fields.insert(
                "priority",
                mongodb::bson::to_bson(priority).context("Failed to encode priority")?,
            );
        }
        if let Some(audience) = &req.audience {
            update_fields.insert("audience", audience);
        }
        if let Some(expires_at) = &req.expires_at {
            update_fields.insert(
                "expiresAt",
                bson::DateTime::from_millis(expires_at.timestamp_millis()),
            );
        }
        if let Some(is_active) = req.is_active {
            update_fields.insert("isActive", is_active);
        }
        update_fields.insert("updatedAt", bson::DateTime::now());

        if update_fields.len() <= 1 {
            return Err(anyhow!("No fields to update"));
        }

        let collection = self.mongo.collection::<Alert>("alerts");
        let result = collection
            .update_one(doc! { "_id": object_id }, doc! { "$set": update_fields })
            .await
            .context("Failed to update alert")?;

        if result.matched_count == 0 {
            return Err(anyhow!("Alert not found"));
        }

        self.get(alert_id).await
    }

    pub async fn delete(&self, alert_id: &str) -> Result<()> {
        let object_id = ObjectId::parse_str(alert_id).context("Invalid alert ID format")?;

        let collection = self.mongo.collection::<Alert>("alerts");
        let result = collection
            .delete_one(doc! { "_id": object_id })
            .await
            .context("Failed to delete alert")?;

        if result.deleted_count == 0 {
            return Err(anyhow!("Alert not found"));
        }

        Ok(())
    }

    /// Record a user's acknowledgment. Idempotent per user: re-acknowledging
    /// overwrites the map entry and the count is recomputed from the map.
    pub async fn acknowledge(&self, alert_id: &str, req: AcknowledgeRequest) -> Result<Alert> {
        let object_id = ObjectId::parse_str(alert_id).context("Invalid alert ID format")?;

        let collection = self.mongo.collection::<Alert>("alerts");
        let alert = collection
            .find_one(doc! { "_id": object_id })
            .await
            .context("Failed to query alert")?
            .ok_or_else(|| anyhow!("Alert not found"))?;

        if !alert.is_active {
            return Err(anyhow!("Alert is no longer active"));
        }

        let ack = Acknowledgment {
            name: req.name,
            acknowledged_at: bson::DateTime::now(),
        };
        let ack_bson = mongodb::bson::to_bson(&ack).context("Failed to encode acknowledgment")?;

        collection
            .update_one(
                doc! { "_id": object_id },
                doc! { "$set": {
                    format!("acknowledgments.{}", req.user_id): ack_bson,
                    "updatedAt": bson::DateTime::now(),
                } },
            )
            .await
            .context("Failed to record acknowledgment")?;

        let updated = collection
            .find_one(doc! { "_id": object_id })
            .await
            .context("Failed to reload alert")?
            .ok_or_else(|| anyhow!("Alert not found"))?;

        let ack_count = updated.acknowledgments.len() as i32;
        collection
            .update_one(
                doc! { "_id": object_id },
                doc! { "$set": { "ackCount": ack_count } },
            )
            .await
            .context("Failed to update acknowledgment count")?;

        Ok(Alert {
            ack_count,
            ..updated
        })
    }

    pub async fn deactivate(&self, alert_id: &str) -> Result<Alert> {
        let object_id = ObjectId::parse_str(alert_id).context("Invalid alert ID format")?;

        let collection = self.mongo.collection::<Alert>("alerts");
        let result = collection
            .update_one(
                doc! { "_id": object_id },
                doc! { "$set": { "isActive": false, "updatedAt": bson::DateTime::now() } },
            )
            .await
            .context("Failed to deactivate alert")?;

        if result.matched_count == 0 {
            return Err(anyhow!("Alert not found"));
        }

        self.get(alert_id).await
    }
}
