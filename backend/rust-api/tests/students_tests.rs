use axum::http::StatusCode;
use serde_json::json;

mod common;

async fn create_student(
    app: &axum::Router,
    token: &str,
    name: &str,
    class: &str,
) -> serde_json::Value {
    let (status, body) = common::post_json(
        app,
        "/api/students",
        Some(token),
        json!({
            "name": name,
            "email": common::unique_email("student"),
            "class": class,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    common::parse(&body)["student"].clone()
}

#[tokio::test]
async fn test_create_student_with_defaults() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let student = create_student(&app, &token, "Ravi Kumar", "7").await;

    assert_eq!(student["role"], "student");
    assert_eq!(student["class"], "7");
    assert_eq!(student["totalPoints"], 0);
    assert_eq!(student["drillsAttended"], 0);
    assert!(student["admissionNo"].as_str().unwrap().starts_with("STU-"));
}

#[tokio::test]
async fn test_get_student_by_id() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let created = create_student(&app, &token, "Meena Iyer", "9").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = common::get(&app, &format!("/api/students/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    assert_eq!(json["student"]["name"], "Meena Iyer");
}

#[tokio::test]
async fn test_get_student_unknown_id_is_404() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let (status, _) = common::get(
        &app,
        "/api/students/ffffffffffffffffffffffff",
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_student_malformed_id_is_400() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let (status, _) = common::get(&app, "/api/students/not-an-id", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_student_fields() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let created = create_student(&app, &token, "Old Name", "6").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = common::put_json(
        &app,
        &format!("/api/students/{}", id),
        Some(&token),
        json!({ "name": "New Name", "class": "7" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    assert_eq!(json["student"]["name"], "New Name");
    assert_eq!(json["student"]["class"], "7");
}

#[tokio::test]
async fn test_update_student_empty_body_rejected() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let created = create_student(&app, &token, "Untouched", "6").await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = common::put_json(
        &app,
        &format!("/api/students/{}", id),
        Some(&token),
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_student() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let created = create_student(&app, &token, "To Delete", "10").await;
    let id = created["id"].as_str().unwrap();

    let (status, _) =
        common::delete(&app, &format!("/api/students/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::get(&app, &format!("/api/students/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting again reports not found
    let (status, _) =
        common::delete(&app, &format!("/api/students/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_students_filters_by_class() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    // A class name unlikely to collide with other tests
    let class = format!("cls-{}", mongodb::bson::oid::ObjectId::new().to_hex());
    create_student(&app, &token, "Class Member A", &class).await;
    create_student(&app, &token, "Class Member B", &class).await;

    let (status, body) =
        common::get(&app, &format!("/api/students?class={}", class), Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    assert_eq!(json["count"], 2);
    for student in json["students"].as_array().unwrap() {
        assert_eq!(student["class"], json!(class));
    }
}

#[tokio::test]
async fn test_list_students_search_by_name() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let marker = mongodb::bson::oid::ObjectId::new().to_hex();
    let name = format!("Searchable {}", marker);
    create_student(&app, &token, &name, "8").await;

    let (status, body) =
        common::get(&app, &format!("/api/students?search={}", marker), Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    assert_eq!(json["count"], 1);
    assert_eq!(json["students"][0]["name"], json!(name));
}

#[tokio::test]
async fn test_duplicate_student_email_rejected() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let email = common::unique_email("dup-student");
    let payload = json!({ "name": "Dup", "email": email, "class": "5" });

    let (status, _) = common::post_json(&app, "/api/students", Some(&token), payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = common::post_json(&app, "/api/students", Some(&token), payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
