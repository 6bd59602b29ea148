// ABOUTME: HTTP integration tests for body weight entries and their CSV import/export
// ABOUTME: Covers range checks, one entry per day, partial imports and the exported document
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::TestApp;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_weight_entry_range_and_uniqueness() {
    let app = TestApp::new().await;
    let user = app.user("scale").await;

    let response = AxumTestRequest::post("/api/v1/weight")
        .bearer(&user.token)
        .json(&json!({"weight": 12.0, "date": "2025-01-01"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALUE_OUT_OF_RANGE");

    AxumTestRequest::post("/api/v1/weight")
        .bearer(&user.token)
        .json(&json!({"weight": 82.5, "date": "2025-01-01"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let response = AxumTestRequest::post("/api/v1/weight")
        .bearer(&user.token)
        .json(&json!({"weight": 82.0, "date": "2025-01-01"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_list_filters_by_date_range() {
    let app = TestApp::new().await;
    let user = app.user("scale").await;

    for (date, weight) in [("2025-01-01", 82.0), ("2025-01-15", 81.2), ("2025-02-01", 80.4)] {
        AxumTestRequest::post("/api/v1/weight")
            .bearer(&user.token)
            .json(&json!({"weight": weight, "date": date}))
            .send(app.router())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let entries: Vec<Value> = AxumTestRequest::get("/api/v1/weight?from=2025-01-10&to=2025-01-31")
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["weight"], 81.2);
}

#[tokio::test]
async fn test_other_users_cannot_edit_entries() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let other = app.user("other").await;

    let entry: Value = AxumTestRequest::post("/api/v1/weight")
        .bearer(&owner.token)
        .json(&json!({"weight": 70.0}))
        .send(app.router())
        .await
        .json();
    let uri = format!("/api/v1/weight/{}", entry["id"].as_str().unwrap());

    let response = AxumTestRequest::put(&uri)
        .bearer(&other.token)
        .json(&json!({"weight": 60.0}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    AxumTestRequest::delete(&uri)
        .bearer(&owner.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_csv_import_reports_bad_rows_and_skips_duplicates() {
    let app = TestApp::new().await;
    let user = app.user("scale").await;

    AxumTestRequest::post("/api/v1/weight")
        .bearer(&user.token)
        .json(&json!({"weight": 90.0, "date": "2025-03-02"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let csv = "date,weight\n2025-03-01,91.0\n2025-03-02,90.5\nyesterday,90.0\n\
               2025-03-04,1000\n2025-03-05,89.6\n";
    let report: Value = AxumTestRequest::post("/api/v1/weight/import")
        .bearer(&user.token)
        .raw("text/csv", csv)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(report["imported"], 2);
    assert_eq!(report["skipped"], json!(["2025-03-02"]));
    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["line"], 4);
    assert_eq!(errors[1]["line"], 5);

    // The existing entry keeps its value
    let entries: Vec<Value> = AxumTestRequest::get("/api/v1/weight?from=2025-03-02&to=2025-03-02")
        .bearer(&user.token)
        .send(app.router())
        .await
        .json();
    assert_eq!(entries[0]["weight"], 90.0);
}

#[tokio::test]
async fn test_csv_import_requires_header() {
    let app = TestApp::new().await;
    let user = app.user("scale").await;

    let response = AxumTestRequest::post("/api/v1/weight/import")
        .bearer(&user.token)
        .raw("text/csv", "when,kg\n2025-03-01,91.0\n")
        .send(app.router())
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_csv_export_is_sorted_by_date() {
    let app = TestApp::new().await;
    let user = app.user("scale").await;

    for (date, weight) in [("2025-02-01", 80.4), ("2025-01-01", 82.0)] {
        AxumTestRequest::post("/api/v1/weight")
            .bearer(&user.token)
            .json(&json!({"weight": weight, "date": date}))
            .send(app.router())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = AxumTestRequest::get("/api/v1/weight/export")
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    assert!(response
        .header("content-type")
        .is_some_and(|v| v.starts_with("text/csv")));

    let lines: Vec<String> = response.text().lines().map(str::to_owned).collect();
    assert_eq!(lines, ["date,weight", "2025-01-01,82.0", "2025-02-01,80.4"]);
}

#[tokio::test]
async fn test_csv_import_rejects_oversized_body() {
    let app = TestApp::new().await;
    let user = app.user("scale").await;

    let mut csv = String::from("date,weight\n");
    while csv.len() <= 2 * 1024 * 1024 {
        csv.push_str("2025-03-01,91.0\n");
    }

    let response = AxumTestRequest::post("/api/v1/weight/import")
        .bearer(&user.token)
        .raw("text/csv", csv)
        .send(app.router())
        .await;

    assert_eq!(response.status(), 413);
}
