// ABOUTME: HTTP integration tests for gyms, member management and trainer access
// ABOUTME: Covers gym visibility, role changes, the inactivity overview, notes and contracts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{TestApp, TestUser};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use uuid::Uuid;
use workout_core::permissions::UserRole;

async fn create_gym(app: &TestApp, manager: &TestUser, name: &str) -> Uuid {
    let gym: Value = AxumTestRequest::post("/api/v1/gyms")
        .bearer(&manager.token)
        .json(&json!({"name": name, "city": "Springfield"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    gym["id"].as_str().unwrap().parse().unwrap()
}

// ============================================================================
// Gyms
// ============================================================================

#[tokio::test]
async fn test_only_general_managers_create_gyms() {
    let app = TestApp::new().await;
    let user = app.user("member").await;
    let general = app.user_with_role("boss", UserRole::GeneralManager).await;

    let response = AxumTestRequest::post("/api/v1/gyms")
        .bearer(&user.token)
        .json(&json!({"name": "Iron Temple"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    create_gym(&app, &general, "Iron Temple").await;
}

#[tokio::test]
async fn test_gym_list_is_scoped_to_own_gym() {
    let app = TestApp::new().await;
    let general = app.user_with_role("boss", UserRole::GeneralManager).await;
    let north = create_gym(&app, &general, "North").await;
    create_gym(&app, &general, "South").await;
    let member = app.gym_user("member", UserRole::User, north).await;
    let loner = app.user("loner").await;

    let all: Vec<Value> = AxumTestRequest::get("/api/v1/gyms")
        .bearer(&general.token)
        .send(app.router())
        .await
        .json();
    assert_eq!(all.len(), 2);

    let own: Vec<Value> = AxumTestRequest::get("/api/v1/gyms")
        .bearer(&member.token)
        .send(app.router())
        .await
        .json();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["name"], "North");

    let none: Vec<Value> = AxumTestRequest::get("/api/v1/gyms")
        .bearer(&loner.token)
        .send(app.router())
        .await
        .json();
    assert!(none.is_empty());
}

// ============================================================================
// Members
// ============================================================================

#[tokio::test]
async fn test_member_cannot_be_added_to_second_gym() {
    let app = TestApp::new().await;
    let general = app.user_with_role("boss", UserRole::GeneralManager).await;
    let north = create_gym(&app, &general, "North").await;
    let south = create_gym(&app, &general, "South").await;
    let member = app.gym_user("member", UserRole::User, north).await;

    let response = AxumTestRequest::put(&format!("/api/v1/gyms/{south}/members/{}", member.id))
        .bearer(&general.token)
        .send(app.router())
        .await;

    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_gym_manager_role_changes() {
    let app = TestApp::new().await;
    let general = app.user_with_role("boss", UserRole::GeneralManager).await;
    let gym = create_gym(&app, &general, "North").await;
    let manager = app.gym_user("manager", UserRole::GymManager, gym).await;
    let member = app.gym_user("member", UserRole::User, gym).await;
    let uri = format!("/api/v1/gyms/{gym}/members/{}/role", member.id);

    AxumTestRequest::put(&uri)
        .bearer(&manager.token)
        .json(&json!({"role": "trainer"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = AxumTestRequest::put(&uri)
        .bearer(&manager.token)
        .json(&json!({"role": "general_manager"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::put(&format!("/api/v1/gyms/{gym}/members/{}/role", manager.id))
        .bearer(&manager.token)
        .json(&json!({"role": "user"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_inactive_member_overview() {
    let app = TestApp::new().await;
    let general = app.user_with_role("boss", UserRole::GeneralManager).await;
    let gym = create_gym(&app, &general, "North").await;
    let trainer = app.gym_user("trainer", UserRole::Trainer, gym).await;
    let active = app.gym_user("active", UserRole::User, gym).await;
    app.gym_user("idle", UserRole::User, gym).await;
    let hidden = app.gym_user("hidden", UserRole::User, gym).await;
    let squat = app.exercise("Squat").await;

    let workout: Value = AxumTestRequest::post("/api/v1/workouts")
        .bearer(&active.token)
        .json(&json!({"name": "Legs"}))
        .send(app.router())
        .await
        .json();
    AxumTestRequest::post("/api/v1/logs")
        .bearer(&active.token)
        .json(&json!({
            "workout_id": workout["id"],
            "exercise_id": squat,
            "reps": 5,
            "weight": 100.0
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    AxumTestRequest::put(&format!("/api/v1/gyms/{gym}/user-config"))
        .bearer(&hidden.token)
        .json(&json!({"include_inactive": false}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let uri = format!("/api/v1/gyms/{gym}/members?inactive=true");
    let inactive: Vec<Value> = AxumTestRequest::get(&uri)
        .bearer(&trainer.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let names: Vec<&str> = inactive.iter().map(|m| m["username"].as_str().unwrap()).collect();
    assert!(names.contains(&"idle"));
    assert!(!names.contains(&"active"));
    assert!(!names.contains(&"hidden"));

    let response = AxumTestRequest::get(&format!("/api/v1/gyms/{gym}/members"))
        .bearer(&active.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_weeks_inactive_must_be_positive() {
    let app = TestApp::new().await;
    let general = app.user_with_role("boss", UserRole::GeneralManager).await;
    let gym = create_gym(&app, &general, "North").await;

    let response = AxumTestRequest::put(&format!("/api/v1/gyms/{gym}/config"))
        .bearer(&general.token)
        .json(&json!({"weeks_inactive": 0}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    let config: Value = AxumTestRequest::put(&format!("/api/v1/gyms/{gym}/config"))
        .bearer(&general.token)
        .json(&json!({"weeks_inactive": 6}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(config["weeks_inactive"], 6);
}

// ============================================================================
// Trainer access to member data
// ============================================================================

#[tokio::test]
async fn test_trainer_reads_but_cannot_edit_member_data() {
    let app = TestApp::new().await;
    let general = app.user_with_role("boss", UserRole::GeneralManager).await;
    let north = create_gym(&app, &general, "North").await;
    let south = create_gym(&app, &general, "South").await;
    let trainer = app.gym_user("coach", UserRole::Trainer, north).await;
    let outsider = app.gym_user("rival", UserRole::Trainer, south).await;
    let member = app.gym_user("member", UserRole::User, north).await;

    let workout: Value = AxumTestRequest::post("/api/v1/workouts")
        .bearer(&member.token)
        .json(&json!({"name": "Full Body"}))
        .send(app.router())
        .await
        .json();

    let list: Vec<Value> = AxumTestRequest::get(&format!("/api/v1/workouts?user_id={}", member.id))
        .bearer(&trainer.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(list.len(), 1);

    let response = AxumTestRequest::put(&format!(
        "/api/v1/workouts/{}",
        workout["id"].as_str().unwrap()
    ))
    .bearer(&trainer.token)
    .json(&json!({"name": "Coach's pick"}))
    .send(app.router())
    .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::get(&format!("/api/v1/workouts?user_id={}", member.id))
        .bearer(&outsider.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);
}

// ============================================================================
// Notes and contracts
// ============================================================================

#[tokio::test]
async fn test_trainer_notes_on_members() {
    let app = TestApp::new().await;
    let general = app.user_with_role("boss", UserRole::GeneralManager).await;
    let gym = create_gym(&app, &general, "North").await;
    let trainer = app.gym_user("coach", UserRole::Trainer, gym).await;
    let member = app.gym_user("member", UserRole::User, gym).await;
    let uri = format!("/api/v1/members/{}/notes", member.id);

    let response = AxumTestRequest::post(&uri)
        .bearer(&trainer.token)
        .json(&json!({"note": "   "}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    AxumTestRequest::post(&uri)
        .bearer(&trainer.token)
        .json(&json!({"note": "Knee injury, no deep squats"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let notes: Vec<Value> = AxumTestRequest::get(&uri)
        .bearer(&trainer.token)
        .send(app.router())
        .await
        .json();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["author_id"], trainer.id.to_string());

    let response = AxumTestRequest::get(&uri)
        .bearer(&member.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_contracts_reference_own_gym_catalogue() {
    let app = TestApp::new().await;
    let general = app.user_with_role("boss", UserRole::GeneralManager).await;
    let north = create_gym(&app, &general, "North").await;
    let south = create_gym(&app, &general, "South").await;
    let manager = app.gym_user("manager", UserRole::GymManager, north).await;
    let member = app.gym_user("member", UserRole::User, north).await;
    let other_member = app.gym_user("other", UserRole::User, north).await;

    let local_type: Value = AxumTestRequest::post(&format!("/api/v1/gyms/{north}/contract-types"))
        .bearer(&manager.token)
        .json(&json!({"name": "Monthly flat rate"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let foreign_type: Value = AxumTestRequest::post(&format!("/api/v1/gyms/{south}/contract-types"))
        .bearer(&general.token)
        .json(&json!({"name": "Student"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let sauna: Value = AxumTestRequest::post(&format!("/api/v1/gyms/{north}/contract-options"))
        .bearer(&manager.token)
        .json(&json!({"name": "Sauna"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let uri = format!("/api/v1/members/{}/contracts", member.id);
    let response = AxumTestRequest::post(&uri)
        .bearer(&manager.token)
        .json(&json!({
            "contract_type_id": foreign_type["id"],
            "amount": 30.0,
            "date_start": "2025-01-01"
        }))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::post(&uri)
        .bearer(&manager.token)
        .json(&json!({"amount": -1.0, "date_start": "2025-01-01"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    let contract: Value = AxumTestRequest::post(&uri)
        .bearer(&manager.token)
        .json(&json!({
            "contract_type_id": local_type["id"],
            "options": [sauna["id"]],
            "amount": 39.9,
            "payment": "monthly",
            "date_start": "2025-01-01",
            "date_end": "2025-12-31"
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(contract["gym_id"], north.to_string());
    assert_eq!(contract["is_active"], true);

    let own: Vec<Value> = AxumTestRequest::get(&uri)
        .bearer(&member.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(own.len(), 1);

    let response = AxumTestRequest::get(&uri)
        .bearer(&other_member.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);
}
