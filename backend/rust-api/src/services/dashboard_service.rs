use anyhow::{Context, Result};
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Database;
use serde::Serialize;

use crate::models::alert::Alert;
use crate::models::drill::Drill;
use crate::models::user::User;

/// Fixed campus preparedness health score surfaced on the dashboard.
const PREPAREDNESS_SCORE: i64 = 85;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: u64,
    pub total_staff: u64,
    pub total_drills: u64,
    pub drills_completed: u64,
    pub drills_scheduled: u64,
    pub active_alerts: u64,
    pub total_modules: u64,
    pub preparedness_score: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub student_id: String,
    pub name: String,
    pub points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: String,
    pub kind: &'static str,
    pub title: String,
    pub detail: String,
    pub timestamp: String,
}

pub struct DashboardService {
    mongo: Database,
}

impl DashboardService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    /// Aggregate counts across the collections, issued concurrently.
    pub async fn stats(&self) -> Result<DashboardStats> {
        let users = self.mongo.collection::<User>("users");
        let drills = self.mongo.collection::<Drill>("drills");
        let alerts = self.mongo.collection::<Alert>("alerts");
        let modules = self
            .mongo
            .collection::<mongodb::bson::Document>("modules");

        let (
            total_students,
            total_staff,
            total_drills,
            drills_completed,
            drills_scheduled,
            active_alerts,
            total_modules,
        ) = tokio::try_join!(
            users.count_documents(doc! { "role": "student" }),
            users.count_documents(doc! { "role": "staff" }),
            drills.count_documents(doc! {}),
            drills.count_documents(doc! { "status": "completed" }),
            drills.count_documents(doc! { "status": "scheduled" }),
            alerts.count_documents(doc! { "isActive": true }),
            modules.count_documents(doc! { "isActive": true }),
        )
        .context("Failed to aggregate dashboard stats")?;

        Ok(DashboardStats {
            total_students,
            total_staff,
            total_drills,
            drills_completed,
            drills_scheduled,
            active_alerts,
            total_modules,
            preparedness_score: PREPAREDNESS_SCORE,
        })
    }

    /// Top-10 students by total points.
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let users = self.mongo.collection::<User>("users");

        let mut cursor = users
            .find(doc! { "role": "student" })
            .sort(doc! { "totalPoints": -1 })
            .limit(10)
            .await
            .context("Failed to query leaderboard")?;

        let mut entries = Vec::new();
        let mut rank = 0u32;
        while let Some(student) = cursor
            .try_next()
            .await
            .context("Failed to read student from cursor")?
        {
            rank += 1;
            entries.push(LeaderboardEntry {
                rank,
                student_id: student.id.map(|id| id.to_hex()).unwrap_or_default(),
                name: student.name,
                points: student.total_points,
                class: student.class,
            });
        }

        Ok(entries)
    }

    /// Merge the five most recent drills and alerts into one feed, newest
    /// first, truncated to ten entries.
    pub async fn activities(&self) -> Result<Vec<ActivityItem>> {
        let drills = self.mongo.collection::<Drill>("drills");
        let alerts = self.mongo.collection::<Alert>("alerts");

        let mut items: Vec<(i64, ActivityItem)> = Vec::new();

        let mut drill_cursor = drills
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .limit(5)
            .await
            .context("Failed to query recent drills")?;
        while let Some(drill) = drill_cursor
            .try_next()
            .await
            .context("Failed to read drill from cursor")?
        {
            items.push((
                drill.created_at.timestamp_millis(),
                ActivityItem {
                    id: drill.id.to_hex(),
                    kind: "drill",
                    title: drill.title,
                    detail: drill.status.as_str().to_string(),
                    timestamp: crate::models::to_rfc3339(&drill.created_at),
                },
            ));
        }

        let mut alert_cursor = alerts
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .limit(5)
            .await
            .context("Failed to query recent alerts")?;
        while let Some(alert) = alert_cursor
            .try_next()
            .await
            .context("Failed to read alert from cursor")?
        {
            items.push((
                alert.created_at.timestamp_millis(),
                ActivityItem {
                    id: alert.id.to_hex(),
                    kind: "alert",
                    title: alert.title,
                    detail: format!("{:?}", alert.priority).to_lowercase(),
                    timestamp: crate::models::to_rfc3339(&alert.created_at),
                },
            ));
        }

        items.sort_by(|a, b| b.0.cmp(&a.0));
        items.truncate(10);

        Ok(items.into_iter().map(|(_, item)| item).collect())
    }
}
