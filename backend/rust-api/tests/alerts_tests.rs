use axum::http::StatusCode;
use serde_json::json;

mod common;

async fn create_alert(app: &axum::Router, token: &str, priority: &str) -> serde_json::Value {
    let (status, body) = common::post_json(
        app,
        "/api/alerts",
        Some(token),
        json!({
            "title": "Cyclone Warning",
            "message": "IMD has issued a cyclone warning for the district.",
            "alertType": "cyclone",
            "priority": priority,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    common::parse(&body)["alert"].clone()
}

#[tokio::test]
async fn test_create_alert_defaults() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let (status, body) = common::post_json(
        &app,
        "/api/alerts",
        Some(&token),
        json!({
            "title": "Water Logging",
            "message": "Ground floor corridors are water-logged.",
            "alertType": "flood",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let json = common::parse(&body);
    assert_eq!(json["alert"]["priority"], "medium");
    assert_eq!(json["alert"]["audience"], "all");
    assert_eq!(json["alert"]["isActive"], true);
    assert_eq!(json["alert"]["ackCount"], 0);
}

#[tokio::test]
async fn test_acknowledge_is_idempotent_per_user() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let alert = create_alert(&app, &token, "high").await;
    let id = alert["id"].as_str().unwrap();

    let ack = json!({ "userId": "u-100", "name": "Class Teacher" });

    let (status, body) = common::post_json(
        &app,
        &format!("/api/alerts/{}/acknowledge", id),
        Some(&token),
        ack.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(common::parse(&body)["alert"]["ackCount"], 1);

    // Same user acknowledging again does not inflate the count
    let (status, body) = common::post_json(
        &app,
        &format!("/api/alerts/{}/acknowledge", id),
        Some(&token),
        ack,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(common::parse(&body)["alert"]["ackCount"], 1);

    // A second user raises it
    let (status, body) = common::post_json(
        &app,
        &format!("/api/alerts/{}/acknowledge", id),
        Some(&token),
        json!({ "userId": "u-200", "name": "Lab Assistant" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(common::parse(&body)["alert"]["ackCount"], 2);
}

#[tokio::test]
async fn test_acknowledge_inactive_alert_rejected() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let alert = create_alert(&app, &token, "low").await;
    let id = alert["id"].as_str().unwrap();

    let (status, body) = common::post_json(
        &app,
        &format!("/api/alerts/{}/deactivate", id),
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(common::parse(&body)["alert"]["isActive"], false);

    let (status, _) = common::post_json(
        &app,
        &format!("/api/alerts/{}/acknowledge", id),
        Some(&token),
        json!({ "userId": "u-300", "name": "Late Reader" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_alerts_active_filter() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let alert = create_alert(&app, &token, "critical").await;
    let id = alert["id"].as_str().unwrap();

    let (status, body) = common::get(&app, "/api/alerts?active=true", Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    assert!(json["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .all(|a| a["isActive"] == true));
    assert!(json["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a["id"] == json!(id)));
}

#[tokio::test]
async fn test_update_and_delete_alert() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let alert = create_alert(&app, &token, "medium").await;
    let id = alert["id"].as_str().unwrap();

    let (status, body) = common::put_json(
        &app,
        &format!("/api/alerts/{}", id),
        Some(&token),
        json!({ "priority": "critical", "message": "Updated guidance issued." }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    assert_eq!(json["alert"]["priority"], "critical");
    assert_eq!(json["alert"]["message"], "Updated guidance issued.");

    let (status, _) = common::delete(&app, &format!("/api/alerts/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::get(&app, &format!("/api/alerts/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_alert_missing_title_rejected() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let (status, _) = common::post_json(
        &app,
        "/api/alerts",
        Some(&token),
        json!({ "message": "No title here", "alertType": "fire" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
