// ABOUTME: HTTP integration tests for workout logs, sessions, the calendar and schedules
// ABOUTME: Covers ownership checks, validation, session uniqueness and current workout resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::{Datelike, Duration, Utc};
use common::{TestApp, TestUser};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

async fn workout_id(app: &TestApp, user: &TestUser, name: &str) -> String {
    let workout: Value = AxumTestRequest::post("/api/v1/workouts")
        .bearer(&user.token)
        .json(&json!({"name": name}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    workout["id"].as_str().unwrap().to_owned()
}

// ============================================================================
// Logs
// ============================================================================

#[tokio::test]
async fn test_log_entries_for_own_workout() {
    let app = TestApp::new().await;
    let user = app.user("lifter").await;
    let squat = app.exercise("Squat").await;
    let bench = app.exercise("Bench Press").await;
    let workout = workout_id(&app, &user, "Strength").await;

    for (exercise, reps) in [(squat, 5), (squat, 5), (bench, 8)] {
        AxumTestRequest::post("/api/v1/logs")
            .bearer(&user.token)
            .json(&json!({
                "workout_id": workout,
                "exercise_id": exercise,
                "reps": reps,
                "weight": 100.0,
                "date": "2025-03-10"
            }))
            .send(app.router())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let logs: Vec<Value> = AxumTestRequest::get(&format!("/api/v1/logs?exercise={squat}"))
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l["reps"] == 5));
}

#[tokio::test]
async fn test_log_validation() {
    let app = TestApp::new().await;
    let user = app.user("lifter").await;
    let squat = app.exercise("Squat").await;
    let workout = workout_id(&app, &user, "Strength").await;

    let too_many_reps = json!({
        "workout_id": workout,
        "exercise_id": squat,
        "reps": 601,
        "weight": 20.0
    });
    let response = AxumTestRequest::post("/api/v1/logs")
        .bearer(&user.token)
        .json(&too_many_reps)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    let unknown_exercise = json!({
        "workout_id": workout,
        "exercise_id": uuid::Uuid::new_v4(),
        "reps": 5,
        "weight": 20.0
    });
    let response = AxumTestRequest::post("/api/v1/logs")
        .bearer(&user.token)
        .json(&unknown_exercise)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_cannot_log_against_someone_elses_workout() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let other = app.user("other").await;
    let squat = app.exercise("Squat").await;
    let workout = workout_id(&app, &owner, "Strength").await;

    let response = AxumTestRequest::post("/api/v1/logs")
        .bearer(&other.token)
        .json(&json!({"workout_id": workout, "exercise_id": squat, "reps": 5, "weight": 60.0}))
        .send(app.router())
        .await;

    assert_eq!(response.status(), 403);
}

// ============================================================================
// Sessions and calendar
// ============================================================================

#[tokio::test]
async fn test_one_session_per_day() {
    let app = TestApp::new().await;
    let user = app.user("lifter").await;
    let workout = workout_id(&app, &user, "Strength").await;
    let session = json!({
        "workout_id": workout,
        "date": "2025-03-10",
        "impression": "good",
        "time_start": "18:00:00",
        "time_end": "19:15:00"
    });

    AxumTestRequest::post("/api/v1/sessions")
        .bearer(&user.token)
        .json(&session)
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let response = AxumTestRequest::post("/api/v1/sessions")
        .bearer(&user.token)
        .json(&session)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_session_times_must_be_paired_and_ordered() {
    let app = TestApp::new().await;
    let user = app.user("lifter").await;
    let workout = workout_id(&app, &user, "Strength").await;

    let response = AxumTestRequest::post("/api/v1/sessions")
        .bearer(&user.token)
        .json(&json!({"workout_id": workout, "time_start": "18:00:00"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::post("/api/v1/sessions")
        .bearer(&user.token)
        .json(&json!({"workout_id": workout, "time_start": "19:00:00", "time_end": "18:00:00"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_calendar_groups_logs_and_sessions_by_day() {
    let app = TestApp::new().await;
    let user = app.user("lifter").await;
    let squat = app.exercise("Squat").await;
    let workout = workout_id(&app, &user, "Strength").await;

    for date in ["2025-03-10", "2025-03-12", "2025-04-01"] {
        AxumTestRequest::post("/api/v1/logs")
            .bearer(&user.token)
            .json(&json!({
                "workout_id": workout,
                "exercise_id": squat,
                "reps": 5,
                "weight": 80.0,
                "date": date
            }))
            .send(app.router())
            .await
            .assert_status(StatusCode::CREATED);
    }
    AxumTestRequest::post("/api/v1/sessions")
        .bearer(&user.token)
        .json(&json!({"workout_id": workout, "date": "2025-03-12", "notes": "Felt strong"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let days: Vec<Value> = AxumTestRequest::get("/api/v1/calendar/2025/3")
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2025-03-10");
    assert!(days[0]["session"].is_null());
    assert_eq!(days[1]["session"]["notes"], "Felt strong");

    let response = AxumTestRequest::get("/api/v1/calendar/2025/13")
        .bearer(&user.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);
}

// ============================================================================
// Schedules
// ============================================================================

#[tokio::test]
async fn test_current_workout_follows_active_schedule() {
    let app = TestApp::new().await;
    let user = app.user("planner").await;
    let first = workout_id(&app, &user, "Phase 1").await;
    let _latest = workout_id(&app, &user, "Phase 2").await;

    let start = Utc::now().date_naive() - Duration::days(7);
    let schedule: Value = AxumTestRequest::post("/api/v1/schedules")
        .bearer(&user.token)
        .json(&json!({"name": "Block", "start_date": start, "is_active": true}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let schedule_id = schedule["id"].as_str().unwrap().to_owned();

    let step: Value = AxumTestRequest::post(&format!("/api/v1/schedules/{schedule_id}/steps"))
        .bearer(&user.token)
        .json(&json!({"workout_id": first, "duration": 2}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let detail: Value = AxumTestRequest::get(&format!("/api/v1/schedules/{schedule_id}"))
        .bearer(&user.token)
        .send(app.router())
        .await
        .json();
    assert_eq!(detail["end_date"], json!(start + Duration::weeks(2)));
    assert_eq!(detail["current_step_id"], step["id"]);

    let current: Value = AxumTestRequest::get("/api/v1/current-workout")
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(current["workout_id"], first);
    assert_eq!(current["schedule_id"], schedule_id);
}

#[tokio::test]
async fn test_current_workout_falls_back_to_latest_workout() {
    let app = TestApp::new().await;
    let user = app.user("planner").await;

    let current: Value = AxumTestRequest::get("/api/v1/current-workout")
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(current.is_null());

    let workout = workout_id(&app, &user, "Only one").await;
    let current: Value = AxumTestRequest::get("/api/v1/current-workout")
        .bearer(&user.token)
        .send(app.router())
        .await
        .json();
    assert_eq!(current["workout_id"], workout);
    assert!(current["schedule_id"].is_null());
}

#[tokio::test]
async fn test_new_active_schedule_deactivates_previous() {
    let app = TestApp::new().await;
    let user = app.user("planner").await;
    let today = Utc::now().date_naive();

    let first: Value = AxumTestRequest::post("/api/v1/schedules")
        .bearer(&user.token)
        .json(&json!({"name": "Winter", "start_date": today, "is_active": true}))
        .send(app.router())
        .await
        .json();
    AxumTestRequest::post("/api/v1/schedules")
        .bearer(&user.token)
        .json(&json!({"name": "Spring", "start_date": today, "is_active": true}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let detail: Value = AxumTestRequest::get(&format!(
        "/api/v1/schedules/{}",
        first["id"].as_str().unwrap()
    ))
    .bearer(&user.token)
    .send(app.router())
    .await
    .json();
    assert_eq!(detail["is_active"], false);
}

#[tokio::test]
async fn test_step_validation() {
    let app = TestApp::new().await;
    let user = app.user("planner").await;
    let other = app.user("other").await;
    let own = workout_id(&app, &user, "Mine").await;
    let foreign = workout_id(&app, &other, "Theirs").await;
    let today = Utc::now().date_naive();

    let schedule: Value = AxumTestRequest::post("/api/v1/schedules")
        .bearer(&user.token)
        .json(&json!({"name": "Year", "start_date": today.with_day(1).unwrap()}))
        .send(app.router())
        .await
        .json();
    let uri = format!(
        "/api/v1/schedules/{}/steps",
        schedule["id"].as_str().unwrap()
    );

    let response = AxumTestRequest::post(&uri)
        .bearer(&user.token)
        .json(&json!({"workout_id": own, "duration": 26}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::post(&uri)
        .bearer(&user.token)
        .json(&json!({"workout_id": foreign, "duration": 4}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::post(&uri)
        .bearer(&other.token)
        .json(&json!({"workout_id": foreign, "duration": 4}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);
}
