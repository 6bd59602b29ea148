// ABOUTME: HTTP integration tests for the exercise catalogue and workout routes
// ABOUTME: Covers moderation, nested day and set editing, canonical form, copying and access
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

async fn create_workout(app: &TestApp, user: &TestUser, name: &str) -> Value {
    AxumTestRequest::post("/api/v1/workouts")
        .bearer(&user.token)
        .json(&json!({"name": name}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

/// Workout with one day, one set and one setting
async fn build_workout(app: &TestApp, user: &TestUser, exercise_id: Uuid) -> (String, String) {
    let workout = create_workout(app, user, "Push Pull").await;
    let workout_id = workout["id"].as_str().unwrap().to_owned();

    let day: Value = AxumTestRequest::post(&format!("/api/v1/workouts/{workout_id}/days"))
        .bearer(&user.token)
        .json(&json!({"description": "Push", "days_of_week": [3, 1, 1]}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(day["days_of_week"], json!([1, 3]));

    let day_id = day["id"].as_str().unwrap();
    let set: Value = AxumTestRequest::post(&format!("/api/v1/days/{day_id}/sets"))
        .bearer(&user.token)
        .json(&json!({"exercises": [exercise_id]}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(set["sets"], 4);
    let set_id = set["id"].as_str().unwrap().to_owned();

    AxumTestRequest::post(&format!("/api/v1/sets/{set_id}/settings"))
        .bearer(&user.token)
        .json(&json!({"exercise_id": exercise_id, "reps": 10, "weight": 50.0}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    (workout_id, set_id)
}

// ============================================================================
// Exercise catalogue
// ============================================================================

#[tokio::test]
async fn test_category_creation_requires_manager() {
    let app = TestApp::new().await;
    let user = app.user("athlete").await;
    let admin = app.user_with_role("root", UserRole::Admin).await;

    let response = AxumTestRequest::post("/api/v1/exercise-categories")
        .bearer(&user.token)
        .json(&json!({"name": "Legs"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    AxumTestRequest::post("/api/v1/exercise-categories")
        .bearer(&admin.token)
        .json(&json!({"name": "Legs"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let categories: Vec<Value> = AxumTestRequest::get("/api/v1/exercise-categories")
        .send(app.router())
        .await
        .json();
    assert!(categories.iter().any(|c| c["name"] == "Legs"));
}

#[tokio::test]
async fn test_submitted_exercise_is_hidden_until_accepted() {
    let app = TestApp::new().await;
    let author = app.user("author").await;
    let stranger = app.user("stranger").await;
    let admin = app.user_with_role("root", UserRole::Admin).await;

    let category: Value = AxumTestRequest::post("/api/v1/exercise-categories")
        .bearer(&admin.token)
        .json(&json!({"name": "Back"}))
        .send(app.router())
        .await
        .json();

    let exercise: Value = AxumTestRequest::post("/api/v1/exercises")
        .bearer(&author.token)
        .json(&json!({"name": "Seal Row", "category_id": category["id"]}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(exercise["status"], "pending");
    let id = exercise["id"].as_str().unwrap();

    let public: Vec<Value> = AxumTestRequest::get("/api/v1/exercises")
        .send(app.router())
        .await
        .json();
    assert!(public.iter().all(|e| e["id"] != id));

    let uri = format!("/api/v1/exercises/{id}");
    AxumTestRequest::get(&uri)
        .bearer(&author.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    let response = AxumTestRequest::get(&uri)
        .bearer(&stranger.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::post(&format!("{uri}/accept"))
        .bearer(&author.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    let accepted: Value = AxumTestRequest::post(&format!("{uri}/accept"))
        .bearer(&admin.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(accepted["status"], "accepted");

    let public: Vec<Value> = AxumTestRequest::get("/api/v1/exercises?search=seal")
        .send(app.router())
        .await
        .json();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["name"], "Seal Row");
}

#[tokio::test]
async fn test_exercise_with_unknown_category_is_rejected() {
    let app = TestApp::new().await;
    let user = app.user("athlete").await;

    let response = AxumTestRequest::post("/api/v1/exercises")
        .bearer(&user.token)
        .json(&json!({"name": "Mystery", "category_id": Uuid::new_v4()}))
        .send(app.router())
        .await;

    assert_eq!(response.status(), 400);
}

// ============================================================================
// Workouts
// ============================================================================

#[tokio::test]
async fn test_canonical_form_renders_sets_and_reps() {
    let app = TestApp::new().await;
    let user = app.user("lifter").await;
    let bench = app.exercise("Bench Press").await;
    let (workout_id, _set_id) = build_workout(&app, &user, bench).await;

    let canonical: Value = AxumTestRequest::get(&format!("/api/v1/workouts/{workout_id}/canonical"))
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    let day = &canonical["days"][0];
    assert_eq!(day["day"]["description"], "Push");
    let exercise = &day["sets"][0]["exercises"][0];
    assert_eq!(exercise["name"], "Bench Press");
    assert_eq!(exercise["reps_text"], "4 × 10 (50 kg)");
    assert_eq!(day["sets"][0]["is_superset"], false);
}

#[tokio::test]
async fn test_day_requires_a_weekday() {
    let app = TestApp::new().await;
    let user = app.user("lifter").await;
    let workout = create_workout(&app, &user, "Empty").await;

    let response = AxumTestRequest::post(&format!(
        "/api/v1/workouts/{}/days",
        workout["id"].as_str().unwrap()
    ))
    .bearer(&user.token)
    .json(&json!({"description": "Rest", "days_of_week": []}))
    .send(app.router())
    .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_setting_exercise_must_belong_to_set() {
    let app = TestApp::new().await;
    let user = app.user("lifter").await;
    let bench = app.exercise("Bench Press").await;
    let squat = app.exercise("Squat").await;
    let (_workout_id, set_id) = build_workout(&app, &user, bench).await;

    let response = AxumTestRequest::post(&format!("/api/v1/sets/{set_id}/settings"))
        .bearer(&user.token)
        .json(&json!({"exercise_id": squat, "reps": 5}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::post(&format!("/api/v1/sets/{set_id}/settings"))
        .bearer(&user.token)
        .json(&json!({"exercise_id": bench, "reps": 5, "rir": 11.0}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_other_users_cannot_read_or_edit_private_workouts() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let other = app.user("other").await;
    let workout = create_workout(&app, &owner, "Secret Plan").await;
    let uri = format!("/api/v1/workouts/{}", workout["id"].as_str().unwrap());

    let response = AxumTestRequest::get(&uri).bearer(&other.token).send(app.router()).await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::delete(&uri).bearer(&other.token).send(app.router()).await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::post(&format!("{uri}/copy"))
        .bearer(&other.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_shared_workout_can_be_copied_but_not_edited() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let other = app.user("other").await;
    let bench = app.exercise("Bench Press").await;
    let (workout_id, _set_id) = build_workout(&app, &owner, bench).await;

    AxumTestRequest::put("/api/v1/profile")
        .bearer(&owner.token)
        .json(&json!({"ro_access": true}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let uri = format!("/api/v1/workouts/{workout_id}");
    let response = AxumTestRequest::put(&uri)
        .bearer(&other.token)
        .json(&json!({"name": "Mine now"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    let copy: Value = AxumTestRequest::post(&format!("{uri}/copy"))
        .bearer(&other.token)
        .json(&json!({"name": "Borrowed"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(copy["user_id"], other.id.to_string());
    assert_eq!(copy["name"], "Borrowed");

    let canonical: Value = AxumTestRequest::get(&format!(
        "/api/v1/workouts/{}/canonical",
        copy["id"].as_str().unwrap()
    ))
    .bearer(&other.token)
    .send(app.router())
    .await
    .json();
    assert_eq!(canonical["days"][0]["sets"][0]["exercises"][0]["settings"][0]["reps"], 10);
}

#[tokio::test]
async fn test_delete_workout() {
    let app = TestApp::new().await;
    let user = app.user("lifter").await;
    let workout = create_workout(&app, &user, "Short lived").await;
    let uri = format!("/api/v1/workouts/{}", workout["id"].as_str().unwrap());

    AxumTestRequest::delete(&uri)
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = AxumTestRequest::get(&uri).bearer(&user.token).send(app.router()).await;
    assert_eq!(response.status(), 404);

    let list: Vec<Value> = AxumTestRequest::get("/api/v1/workouts")
        .bearer(&user.token)
        .send(app.router())
        .await
        .json();
    assert!(list.is_empty());
}
