use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

mod common;

async fn stats(app: &axum::Router, token: &str) -> serde_json::Value {
    let (status, body) = common::get(app, "/api/dashboard/stats", Some(token)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    common::parse(&body)["stats"].clone()
}

#[tokio::test]
#[serial]
async fn test_stats_reflect_new_student_and_drill() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let before = stats(&app, &token).await;

    let (status, _) = common::post_json(
        &app,
        "/api/students",
        Some(&token),
        json!({
            "name": "Stats Student",
            "email": common::unique_email("stats"),
            "class": "6",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = common::post_json(
        &app,
        "/api/drills",
        Some(&token),
        json!({
            "title": "Stats Drill",
            "drillType": "earthquake",
            "scheduledFor": "2026-10-01T10:00:00Z",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let after = stats(&app, &token).await;

    assert_eq!(
        after["totalStudents"].as_u64().unwrap(),
        before["totalStudents"].as_u64().unwrap() + 1
    );
    assert_eq!(
        after["totalDrills"].as_u64().unwrap(),
        before["totalDrills"].as_u64().unwrap() + 1
    );
    assert_eq!(
        after["drillsScheduled"].as_u64().unwrap(),
        before["drillsScheduled"].as_u64().unwrap() + 1
    );
    assert!(after["preparednessScore"].as_i64().unwrap() > 0);
}

#[tokio::test]
#[serial]
async fn test_stats_track_active_alerts() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let before = stats(&app, &token).await;

    let (status, body) = common::post_json(
        &app,
        "/api/alerts",
        Some(&token),
        json!({
            "title": "Stats Alert",
            "message": "Counted in dashboard stats.",
            "alertType": "fire",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = common::parse(&body)["alert"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let mid = stats(&app, &token).await;
    assert_eq!(
        mid["activeAlerts"].as_u64().unwrap(),
        before["activeAlerts"].as_u64().unwrap() + 1
    );

    let (status, _) = common::post_json(
        &app,
        &format!("/api/alerts/{}/deactivate", id),
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let after = stats(&app, &token).await;
    assert_eq!(
        after["activeAlerts"].as_u64().unwrap(),
        before["activeAlerts"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn test_leaderboard_orders_by_points() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let (status, body) = common::get(&app, "/api/dashboard/leaderboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    let entries = json["leaderboard"].as_array().unwrap();

    assert!(entries.len() <= 10);
    let mut previous = i64::MAX;
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry["rank"].as_u64().unwrap(), (i + 1) as u64);
        let points = entry["points"].as_i64().unwrap();
        assert!(points <= previous, "leaderboard not sorted");
        previous = points;
    }
}

#[tokio::test]
async fn test_activities_feed_contains_recent_drill() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let (status, body) = common::post_json(
        &app,
        "/api/drills",
        Some(&token),
        json!({
            "title": "Activity Feed Drill",
            "drillType": "fire",
            "scheduledFor": "2026-10-05T11:00:00Z",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let drill_id = common::parse(&body)["drill"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = common::get(&app, "/api/dashboard/activities", Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    let activities = json["activities"].as_array().unwrap();

    assert!(activities.len() <= 10);
    assert!(activities
        .iter()
        .any(|a| a["id"] == json!(drill_id) && a["kind"] == "drill"));

    // Feed is newest-first
    let timestamps: Vec<&str> = activities
        .iter()
        .map(|a| a["timestamp"].as_str().unwrap())
        .collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted);
}

#[tokio::test]
async fn test_dashboard_requires_auth() {
    let app = common::create_test_app().await;

    let (status, _) = common::get(&app, "/api/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
