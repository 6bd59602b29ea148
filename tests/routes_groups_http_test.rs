// ABOUTME: HTTP integration tests for training groups
// ABOUTME: Covers public joins, applications to private groups, administrators and leaving
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

async fn create_group(app: &TestApp, creator: &TestUser, name: &str, public: bool) -> String {
    let group: Value = AxumTestRequest::post("/api/v1/groups")
        .bearer(&creator.token)
        .json(&json!({"name": name, "public": public}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    group["id"].as_str().unwrap().to_owned()
}

async fn members(app: &TestApp, user: &TestUser, group: &str) -> Vec<Value> {
    AxumTestRequest::get(&format!("/api/v1/groups/{group}/members"))
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json()
}

#[tokio::test]
async fn test_creator_is_first_administrator() {
    let app = TestApp::new().await;
    let creator = app.user("founder").await;
    let group = create_group(&app, &creator, "Morning Runners", true).await;

    let list = members(&app, &creator, &group).await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["user_id"], creator.id.to_string());
    assert_eq!(list[0]["admin"], true);

    let mine: Vec<Value> = AxumTestRequest::get("/api/v1/groups?mine=true")
        .bearer(&creator.token)
        .send(app.router())
        .await
        .json();
    assert_eq!(mine.len(), 1);
}

#[tokio::test]
async fn test_public_group_join_and_duplicate() {
    let app = TestApp::new().await;
    let creator = app.user("founder").await;
    let runner = app.user("runner").await;
    let group = create_group(&app, &creator, "Morning Runners", true).await;
    let uri = format!("/api/v1/groups/{group}/join");

    let joined: Value = AxumTestRequest::post(&uri)
        .bearer(&runner.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(joined["status"], "joined");

    let response = AxumTestRequest::post(&uri)
        .bearer(&runner.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_private_group_application_flow() {
    let app = TestApp::new().await;
    let creator = app.user("founder").await;
    let applicant = app.user("applicant").await;
    let group = create_group(&app, &creator, "Powerlifters", false).await;

    let applied: Value = AxumTestRequest::post(&format!("/api/v1/groups/{group}/join"))
        .bearer(&applicant.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::ACCEPTED)
        .json();
    assert_eq!(applied["status"], "applied");

    let response = AxumTestRequest::get(&format!("/api/v1/groups/{group}/members"))
        .bearer(&applicant.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::get(&format!("/api/v1/groups/{group}/applications"))
        .bearer(&applicant.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    let uri = format!("/api/v1/groups/{group}/applications");
    let applications: Vec<Value> = AxumTestRequest::get(&uri)
        .bearer(&creator.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(applications.len(), 1);

    AxumTestRequest::post(&format!(
        "/api/v1/groups/{group}/applications/{}/accept",
        applicant.id
    ))
    .bearer(&creator.token)
    .send(app.router())
    .await
    .assert_status(StatusCode::NO_CONTENT);

    let list = members(&app, &applicant, &group).await;
    assert_eq!(list.len(), 2);
}

#[tokio::test]
async fn test_last_administrator_must_hand_over() {
    let app = TestApp::new().await;
    let creator = app.user("founder").await;
    let runner = app.user("runner").await;
    let group = create_group(&app, &creator, "Morning Runners", true).await;

    AxumTestRequest::post(&format!("/api/v1/groups/{group}/join"))
        .bearer(&runner.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let response = AxumTestRequest::post(&format!("/api/v1/groups/{group}/leave"))
        .bearer(&creator.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 409);

    let response = AxumTestRequest::post(&format!(
        "/api/v1/groups/{group}/members/{}/demote",
        creator.id
    ))
    .bearer(&creator.token)
    .send(app.router())
    .await;
    assert_eq!(response.status(), 409);

    AxumTestRequest::post(&format!(
        "/api/v1/groups/{group}/members/{}/promote",
        runner.id
    ))
    .bearer(&creator.token)
    .send(app.router())
    .await
    .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::post(&format!("/api/v1/groups/{group}/leave"))
        .bearer(&creator.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let list = members(&app, &runner, &group).await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["admin"], true);
}

#[tokio::test]
async fn test_last_member_leaving_deletes_group() {
    let app = TestApp::new().await;
    let creator = app.user("founder").await;
    let group = create_group(&app, &creator, "Solo", true).await;

    AxumTestRequest::post(&format!("/api/v1/groups/{group}/leave"))
        .bearer(&creator.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = AxumTestRequest::get(&format!("/api/v1/groups/{group}"))
        .bearer(&creator.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_only_administrators_edit_group() {
    let app = TestApp::new().await;
    let creator = app.user("founder").await;
    let runner = app.user("runner").await;
    let group = create_group(&app, &creator, "Morning Runners", true).await;
    AxumTestRequest::post(&format!("/api/v1/groups/{group}/join"))
        .bearer(&runner.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let response = AxumTestRequest::put(&format!("/api/v1/groups/{group}"))
        .bearer(&runner.token)
        .json(&json!({"name": "Evening Runners", "public": true}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::post("/api/v1/groups")
        .bearer(&runner.token)
        .json(&json!({"name": "Morning Runners"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_concurrent_admin_leaves_keep_an_administrator() {
    let app = TestApp::new().await;
    let creator = app.user("founder").await;
    let second = app.user("second").await;
    let runner = app.user("runner").await;
    let group = create_group(&app, &creator, "Morning Runners", true).await;

    for user in [&second, &runner] {
        AxumTestRequest::post(&format!("/api/v1/groups/{group}/join"))
            .bearer(&user.token)
            .send(app.router())
            .await
            .assert_status(StatusCode::CREATED);
    }
    AxumTestRequest::post(&format!(
        "/api/v1/groups/{group}/members/{}/promote",
        second.id
    ))
    .bearer(&creator.token)
    .send(app.router())
    .await
    .assert_status(StatusCode::NO_CONTENT);

    let uri = format!("/api/v1/groups/{group}/leave");
    let (first, other) = tokio::join!(
        AxumTestRequest::post(&uri).bearer(&creator.token).send(app.router()),
        AxumTestRequest::post(&uri).bearer(&second.token).send(app.router()),
    );
    let mut statuses = [first.status(), other.status()];
    statuses.sort_unstable();
    assert_eq!(statuses, [204, 409]);

    let list = members(&app, &runner, &group).await;
    assert_eq!(list.len(), 2);
    assert!(list.iter().any(|m| m["admin"] == true));
}
