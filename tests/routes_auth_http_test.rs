// ABOUTME: HTTP integration tests for health, account and profile routes
// ABOUTME: Covers registration, login, guest conversion, profile updates and body calculations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{TestApp, TEST_PASSWORD};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_sets_request_id_and_robots_headers() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::get("/health").send(app.router()).await;

    assert_eq!(response.status(), 200);
    assert!(response.header("x-request-id").is_some());
    assert_eq!(
        response.header("x-robots-tag").as_deref(),
        Some("noindex, nofollow")
    );
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ready_checks_database() {
    let app = TestApp::new().await;
    let response = AxumTestRequest::get("/ready").send(app.router()).await;
    assert_eq!(response.status(), 200);
}

// ============================================================================
// POST /api/v1/auth/register and /login
// ============================================================================

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::post("/api/v1/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "securePassword123"
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);
    let token: Value = response.json();
    assert_eq!(token["username"], "alice");
    assert_eq!(token["token_type"], "Bearer");

    let response = AxumTestRequest::post("/api/v1/auth/login")
        .json(&json!({"username": "alice@example.com", "password": "securePassword123"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    let login: Value = response.json();
    assert!(login["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = TestApp::new().await;
    app.user("bob").await;

    let response = AxumTestRequest::post("/api/v1/auth/register")
        .json(&json!({"username": "bob", "password": "anotherPassword1"}))
        .send(app.router())
        .await;

    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::post("/api/v1/auth/register")
        .json(&json!({"username": "carol", "password": "short"}))
        .send(app.router())
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.user("dave").await;

    let response = AxumTestRequest::post("/api/v1/auth/login")
        .json(&json!({"username": "dave", "password": "wrong-password"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 401);

    let response = AxumTestRequest::post("/api/v1/auth/login")
        .json(&json!({"username": "dave", "password": TEST_PASSWORD}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_deactivated_user_cannot_log_in() {
    let app = TestApp::new().await;
    let user = app.user("erin").await;
    app.database().users().set_active(user.id, false).await.unwrap();

    let response = AxumTestRequest::post("/api/v1/auth/login")
        .json(&json!({"username": "erin", "password": TEST_PASSWORD}))
        .send(app.router())
        .await;

    assert_eq!(response.status(), 401);
}

// ============================================================================
// Guest accounts
// ============================================================================

#[tokio::test]
async fn test_guest_account_can_be_converted() {
    let app = TestApp::new().await;

    let guest: Value = AxumTestRequest::post("/api/v1/auth/guest")
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let token = guest["access_token"].as_str().unwrap().to_owned();
    assert!(guest["username"].as_str().unwrap().starts_with("guest-"));

    let profile: Value = AxumTestRequest::get("/api/v1/profile")
        .bearer(&token)
        .send(app.router())
        .await
        .json();
    assert_eq!(profile["profile"]["is_temporary"], true);

    let converted: Value = AxumTestRequest::post("/api/v1/auth/convert")
        .bearer(&token)
        .json(&json!({"username": "frank", "password": "frankPassword1"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(converted["username"], "frank");

    let profile: Value = AxumTestRequest::get("/api/v1/profile")
        .bearer(&token)
        .send(app.router())
        .await
        .json();
    assert_eq!(profile["profile"]["is_temporary"], false);

    // A regular account cannot be converted again
    let response = AxumTestRequest::post("/api/v1/auth/convert")
        .bearer(&token)
        .json(&json!({"username": "frank2", "password": "frankPassword1"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 409);
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_requires_authentication() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::get("/api/v1/profile").send(app.router()).await;
    assert_eq!(response.status(), 401);

    let response = AxumTestRequest::get("/api/v1/profile")
        .bearer("not-a-jwt")
        .send(app.router())
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_profile_does_not_expose_password_hash() {
    let app = TestApp::new().await;
    let user = app.user("grace").await;

    let body: Value = AxumTestRequest::get("/api/v1/profile")
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["user"]["username"], "grace");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_profile_update_and_calculations() {
    let app = TestApp::new().await;
    let user = app.user("heidi").await;

    AxumTestRequest::put("/api/v1/profile")
        .bearer(&user.token)
        .json(&json!({"age": 30, "height": 180.0, "gender": "male"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    AxumTestRequest::post("/api/v1/weight")
        .bearer(&user.token)
        .json(&json!({"weight": 80.0}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let stats: Value = AxumTestRequest::get("/api/v1/profile/calculations")
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(stats["weight_kg"], 80.0);
    assert_eq!(stats["bmi"], 24.7);
    assert_eq!(stats["bmi_category"], "normal");
    assert_eq!(stats["bmr"], 1780.0);
}

#[tokio::test]
async fn test_profile_rejects_more_than_24_hours() {
    let app = TestApp::new().await;
    let user = app.user("ivan").await;

    let response = AxumTestRequest::put("/api/v1/profile")
        .bearer(&user.token)
        .json(&json!({"sleep_hours": 10.0, "work_hours": 10.0, "freetime_hours": 8.0}))
        .send(app.router())
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_read_only_sharing_controls_profile_access() {
    let app = TestApp::new().await;
    let owner = app.user("judy").await;
    let other = app.user("mallory").await;
    let uri = format!("/api/v1/profile?user_id={}", owner.id);

    let response = AxumTestRequest::get(&uri)
        .bearer(&other.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    AxumTestRequest::put("/api/v1/profile")
        .bearer(&owner.token)
        .json(&json!({"ro_access": true}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let body: Value = AxumTestRequest::get(&uri)
        .bearer(&other.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["user"]["username"], "judy");
}
