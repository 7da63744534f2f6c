use anyhow::{anyhow, Context, Result};
use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::Database;

use crate::models::drill::{
    AttendanceEntry, AttendanceRequest, AttendanceStatus, CreateDrillRequest, Drill, DrillStatus,
    UpdateDrillRequest,
};
use crate::models::user::User;

/// Points credited to a student the first time they are marked present.
const ATTENDANCE_POINTS: i64 = 10;

pub struct DrillService {
    mongo: Database,
}

impl DrillService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    pub async fn list(&self) -> Result<Vec<Drill>> {
        let collection = self.mongo.collection::<Drill>("drills");

        let mut cursor = collection
            .find(doc! {})
            .sort(doc! { "scheduledFor": -1 })
            .await
            .context("Failed to query drills")?;

        let mut drills = Vec::new();
        while let Some(drill) = cursor
            .try_next()
            .await
            .context("Failed to read drill from cursor")?
        {
            drills.push(drill);
        }

        Ok(drills)
    }

    pub async fn get(&self, drill_id: &str) -> Result<Drill> {
        let object_id = ObjectId::parse_str(drill_id).context("Invalid drill ID format")?;

        let collection = self.mongo.collection::<Drill>("drills");
        collection
            .find_one(doc! { "_id": object_id })
            .await
            .context("Failed to query drill")?
            .ok_or_else(|| anyhow!("Drill not found"))
    }

    pub async fn create(&self, req: CreateDrillRequest, created_by: Option<String>) -> Result<Drill> {
        let collection = self.mongo.collection::<Drill>("drills");

        let now = bson::DateTime::now();
        let drill = Drill {
            id: ObjectId::new(),
            title: req.title,
            drill_type: req.drill_type,
            scheduled_for: bson::DateTime::from_millis(req.scheduled_for.timestamp_millis()),
            duration_minutes: req.duration_minutes.unwrap_or(30),
            target_classes: req.target_classes,
            status: DrillStatus::Scheduled,
            attendance: Default::default(),
            participant_count: 0,
            created_by,
            created_at: now,
            updated_at: now,
        };

        collection
            .insert_one(&drill)
            .await
            .context("Failed to insert drill")?;

        Ok(drill)
    }

    pub async fn update(&self, drill_id: &str, req: UpdateDrillRequest) -> Result<Drill> {
        let object_id = ObjectId::parse_str(drill_id).context("Invalid drill ID format")?;

        let mut update_fields = Document::new();
        if let Some(title) = &req.title {
            update_fields.insert("title", title);
        }
        if let Some(drill_type) = &req.drill_type {
            update_fields.insert("drillType", drill_type);
        }
        if let Some(scheduled_for) = &req.scheduled_for {
            update_fields.insert(
                "scheduledFor",
                bson::DateTime::from_millis(scheduled_for.timestamp_millis()),
            );
        }
        if let Some(duration) = req.duration_minutes {
            update_fields.insert("durationMinutes", duration);
        }
        if let Some(target_classes) = &req.target_classes {
            update_fields.insert("targetClasses", target_classes);
        }
        update_fields.insert("updatedAt", bson::DateTime::now());

        if update_fields.len() <= 1 {
            return Err(anyhow!("No fields to update"));
        }

        let collection = self.mongo.collection::<Drill>("drills");
        let result = collection
            .update_one(doc! { "_id": object_id }, doc! { "$set": update_fields })
            .await
            .context("Failed to update drill")?;

        if result.matched_count == 0 {
            return Err(anyhow!("Drill not found"));
        }

        self.get(drill_id).await
    }

    pub async fn delete(&self, drill_id: &str) -> Result<()> {
        let object_id = ObjectId::parse_str(drill_id).context("Invalid drill ID format")?;

        let collection = self.mongo.collection::<Drill>("drills");
        let result = collection
            .delete_one(doc! { "_id": object_id })
            .await
            .context("Failed to delete drill")?;

        if result.deleted_count == 0 {
            return Err(anyhow!("Drill not found"));
        }

        Ok(())
    }

    pub async fn start(&self, drill_id: &str) -> Result<Drill> {
        self.transition(drill_id, DrillStatus::Scheduled, DrillStatus::InProgress)
            .await
    }

    pub async fn end(&self, drill_id: &str) -> Result<Drill> {
        self.transition(drill_id, DrillStatus::InProgress, DrillStatus::Completed)
            .await
    }

    async fn transition(
        &self,
        drill_id: &str,
        from: DrillStatus,
        to: DrillStatus,
    ) -> Result<Drill> {
        let drill = self.get(drill_id).await?;

        if drill.status != from {
            return Err(anyhow!(
                "Drill cannot move to {} from {}",
                to.as_str(),
                drill.status.as_str()
            ));
        }

        let collection = self.mongo.collection::<Drill>("drills");
        collection
            .update_one(
                doc! { "_id": drill.id },
                doc! { "$set": { "status": to.as_str(), "updatedAt": bson::DateTime::now() } },
            )
            .await
            .context("Failed to update drill status")?;

        self.get(drill_id).await
    }

    /// Record a student's attendance for a drill and credit points.
    ///
    /// The attendance map entry is the idempotency record: a student is
    /// credited drillsAttended/totalPoints only on the transition into
    /// "present", so retries and duplicate marks never double-credit. The
    /// participant count is recomputed from the map rather than incremented.
    pub async fn mark_attendance(&self, drill_id: &str, req: AttendanceRequest) -> Result<Drill> {
        let drill_oid = ObjectId::parse_str(drill_id).context("Invalid drill ID format")?;
        let student_oid =
            ObjectId::parse_str(&req.student_id).context("Invalid student ID format")?;

        let drills = self.mongo.collection::<Drill>("drills");
        let users = self.mongo.collection::<User>("users");

        let drill = drills
            .find_one(doc! { "_id": drill_oid })
            .await
            .context("Failed to query drill")?
            .ok_or_else(|| anyhow!("Drill not found"))?;

        users
            .find_one(doc! { "_id": student_oid, "role": "student" })
            .await
            .context("Failed to query student")?
            .ok_or_else(|| anyhow!("Student not found"))?;

        let was_present = drill
            .attendance
            .get(&req.student_id)
            .map(|entry| entry.status == AttendanceStatus::Present)
            .unwrap_or(false);

        let entry = AttendanceEntry {
            status: req.status,
            marked_at: bson::DateTime::now(),
        };
        let entry_bson =
            mongodb::bson::to_bson(&entry).context("Failed to encode attendance entry")?;

        drills
            .update_one(
                doc! { "_id": drill_oid },
                doc! { "$set": {
                    format!("attendance.{}", req.student_id): entry_bson,
                    "updatedAt": bson::DateTime::now(),
                } },
            )
            .await
            .context("Failed to record attendance")?;

        if req.status == AttendanceStatus::Present && !was_present {
            users
                .update_one(
                    doc! { "_id": student_oid },
                    doc! {
                        "$inc": { "drillsAttended": 1, "totalPoints": ATTENDANCE_POINTS },
                        "$set": { "updatedAt": mongodb::bson::DateTime::now() },
                    },
                )
                .await
                .context("Failed to credit attendance points")?;
        }

        // Recompute from the map so the count stays consistent under retries
        let updated = drills
            .find_one(doc! { "_id": drill_oid })
            .await
            .context("Failed to reload drill")?
            .ok_or_else(|| anyhow!("Drill not found"))?;

        let participant_count = updated
            .attendance
            .values()
            .filter(|entry| entry.status == AttendanceStatus::Present)
            .count() as i32;

        drills
            .update_one(
                doc! { "_id": drill_oid },
                doc! { "$set": { "participantCount": participant_count } },
            )
            .await
            .context("Failed to update participant count")?;

        Ok(Drill {
            participant_count,
            ..updated
        })
    }
}
