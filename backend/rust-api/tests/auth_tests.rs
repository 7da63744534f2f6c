use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_register_success() {
    let app = common::create_test_app().await;
    let email = common::unique_email("register");

    let (status, body) = common::post_json(
        &app,
        "/api/auth/register",
        None,
        json!({
            "name": "Asha Rao",
            "email": email,
            "password": "secret123",
            "class": "8",
            "section": "B",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let json = common::parse(&body);
    assert_eq!(json["success"], true);
    assert!(json["token"].as_str().is_some());
    assert_eq!(json["user"]["email"], email);
    assert_eq!(json["user"]["role"], "student");
    // Password hash must never leak to clients
    assert!(json["user"].get("passwordHash").is_none());
    assert!(body.find("passwordHash").is_none());
    // Student gets a generated admission number
    assert!(json["user"]["admissionNo"]
        .as_str()
        .unwrap()
        .starts_with("STU-"));
}

#[tokio::test]
async fn test_register_duplicate_email_rejected() {
    let app = common::create_test_app().await;
    let email = common::unique_email("dup");

    let payload = json!({
        "name": "First",
        "email": email,
        "password": "secret123",
    });

    let (status, _) = common::post_json(&app, "/api/auth/register", None, payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = common::post_json(&app, "/api/auth/register", None, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json = common::parse(&body);
    assert_eq!(json["success"], false);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("already registered"));
}

#[tokio::test]
async fn test_register_invalid_email_rejected() {
    let app = common::create_test_app().await;

    let (status, body) = common::post_json(
        &app,
        "/api/auth/register",
        None,
        json!({
            "name": "Bad Email",
            "email": "not-an-email",
            "password": "secret123",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn test_seeded_admin_login() {
    let app = common::create_test_app().await;

    let (status, body) = common::post_json(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": "admin@jagruk.edu", "password": "admin123" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    assert_eq!(json["success"], true);
    assert!(json["token"].as_str().is_some());
    assert_eq!(json["user"]["role"], "admin");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = common::create_test_app().await;

    let (status, body) = common::post_json(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": "admin@jagruk.edu", "password": "wrong-password" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let json = common::parse(&body);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = common::create_test_app().await;

    let (status, _) = common::post_json(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": common::unique_email("ghost"), "password": "whatever1" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_with_header_token() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let (status, body) =
        common::post_json(&app, "/api/auth/verify", Some(&token), json!({})).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    assert_eq!(json["valid"], true);
    assert_eq!(json["user"]["email"], "admin@jagruk.edu");
}

#[tokio::test]
async fn test_verify_with_body_token() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;

    let (status, body) =
        common::post_json(&app, "/api/auth/verify", None, json!({ "token": token })).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let json = common::parse(&body);
    assert_eq!(json["valid"], true);
}

#[tokio::test]
async fn test_verify_garbage_token_rejected() {
    let app = common::create_test_app().await;

    let (status, body) = common::post_json(
        &app,
        "/api/auth/verify",
        None,
        json!({ "token": "not.a.jwt" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let json = common::parse(&body);
    assert_eq!(json["valid"], false);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = common::create_test_app().await;

    let (status, _) = common::get(&app, "/api/students", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_rejects_tampered_token() {
    let app = common::create_test_app().await;
    let token = common::admin_token(&app).await;
    let tampered = format!("{}x", token);

    let (status, _) = common::get(&app, "/api/students", Some(&tampered)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_api_route_describes_surface() {
    let app = common::create_test_app().await;

    let (status, body) = common::get(&app, "/api/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json = common::parse(&body);
    assert_eq!(json["success"], false);
    assert!(json["resources"].as_array().is_some());
}
