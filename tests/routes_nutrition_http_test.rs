// ABOUTME: HTTP integration tests for ingredients, weight units and nutrition plans
// ABOUTME: Covers ingredient validation and moderation, plan aggregation and the food diary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::Utc;
use common::{TestApp, TestUser};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use uuid::Uuid;
use workout_core::permissions::UserRole;

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap_or_else(|| panic!("not a number: {actual}"));
    assert!(
        (actual - expected).abs() < 0.011,
        "expected {expected}, got {actual}"
    );
}

async fn create_plan(app: &TestApp, user: &TestUser) -> String {
    let plan: Value = AxumTestRequest::post("/api/v1/nutrition-plans")
        .bearer(&user.token)
        .json(&json!({"description": "Cut"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    plan["id"].as_str().unwrap().to_owned()
}

async fn create_meal(app: &TestApp, user: &TestUser, plan_id: &str, name: &str) -> String {
    let meal: Value = AxumTestRequest::post(&format!("/api/v1/nutrition-plans/{plan_id}/meals"))
        .bearer(&user.token)
        .json(&json!({"name": name, "time": "12:30:00"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    meal["id"].as_str().unwrap().to_owned()
}

async fn add_item(app: &TestApp, user: &TestUser, meal_id: &str, ingredient: Uuid, amount: f64) {
    AxumTestRequest::post(&format!("/api/v1/meals/{meal_id}/items"))
        .bearer(&user.token)
        .json(&json!({"ingredient_id": ingredient, "amount": amount}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);
}

// ============================================================================
// Ingredients
// ============================================================================

#[tokio::test]
async fn test_ingredient_energy_must_match_macros() {
    let app = TestApp::new().await;
    let user = app.user("cook").await;

    let response = AxumTestRequest::post("/api/v1/ingredients")
        .bearer(&user.token)
        .json(&json!({
            "name": "Mystery Bar",
            "energy": 300.0,
            "protein": 10.0,
            "carbohydrates": 10.0,
            "fat": 10.0
        }))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::post("/api/v1/ingredients")
        .bearer(&user.token)
        .json(&json!({
            "name": "Sugar Bomb",
            "energy": 400.0,
            "protein": 0.0,
            "carbohydrates": 50.0,
            "carbohydrates_sugar": 60.0,
            "fat": 22.0
        }))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_submitted_ingredient_needs_review() {
    let app = TestApp::new().await;
    let user = app.user("cook").await;
    let admin = app.user_with_role("root", UserRole::Admin).await;

    let ingredient: Value = AxumTestRequest::post("/api/v1/ingredients")
        .bearer(&user.token)
        .json(&json!({
            "name": "Rolled Oats",
            "energy": 355.0,
            "protein": 13.0,
            "carbohydrates": 60.0,
            "fat": 7.0
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(ingredient["status"], "pending");
    let id = ingredient["id"].as_str().unwrap();

    let public: Vec<Value> = AxumTestRequest::get("/api/v1/ingredients?search=oats")
        .send(app.router())
        .await
        .json();
    assert!(public.is_empty());

    let response = AxumTestRequest::get("/api/v1/ingredients?status=pending")
        .bearer(&user.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    AxumTestRequest::post(&format!("/api/v1/ingredients/{id}/accept"))
        .bearer(&admin.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let public: Vec<Value> = AxumTestRequest::get("/api/v1/ingredients?search=oats")
        .send(app.router())
        .await
        .json();
    assert_eq!(public.len(), 1);
}

#[tokio::test]
async fn test_ingredient_values_with_weight_unit() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("root", UserRole::Admin).await;
    let bread = app.ingredient("Rye Bread", 8.0, 45.0, 2.0).await;

    let uri = format!("/api/v1/ingredients/{bread}/values?amount=50");
    let values: Value = AxumTestRequest::get(&uri)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    // 8*4 + 45*4 + 2*9 = 230 kcal per 100 g
    assert_close(&values["energy"], 115.0);
    assert_close(&values["protein"], 4.0);

    let slice: Value = AxumTestRequest::post("/api/v1/weight-units")
        .bearer(&admin.token)
        .json(&json!({"name": "Slice"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let uri = format!("/api/v1/ingredients/{bread}/weight-units");
    let conversion: Value = AxumTestRequest::post(&uri)
        .bearer(&admin.token)
        .json(&json!({"unit_id": slice["id"], "gram": 40.0}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let values: Value = AxumTestRequest::get(&format!(
        "/api/v1/ingredients/{bread}/values?amount=2&unit={}",
        conversion["id"].as_str().unwrap()
    ))
    .send(app.router())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_close(&values["energy"], 184.0);

    let response = AxumTestRequest::get(&format!("/api/v1/ingredients/{bread}/values?amount=0"))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_ingredient_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("root", UserRole::Admin).await;
    let rice = app.ingredient("Rice", 2.7, 28.0, 0.3).await;
    let plan = create_plan(&app, &admin).await;
    let meal = create_meal(&app, &admin, &plan, "Lunch").await;
    add_item(&app, &admin, &meal, rice, 150.0).await;

    let response = AxumTestRequest::delete(&format!("/api/v1/ingredients/{rice}"))
        .bearer(&admin.token)
        .send(app.router())
        .await;

    assert_eq!(response.status(), 409);
}

// ============================================================================
// Nutrition plans
// ============================================================================

#[tokio::test]
async fn test_plan_values_sum_meals_and_scale_by_body_weight() {
    let app = TestApp::new().await;
    let user = app.user("eater").await;
    let chicken = app.ingredient("Chicken Breast", 31.0, 0.0, 3.6).await;
    let rice = app.ingredient("Rice", 2.7, 28.0, 0.3).await;

    let plan = create_plan(&app, &user).await;
    let lunch = create_meal(&app, &user, &plan, "Lunch").await;
    add_item(&app, &user, &lunch, chicken, 200.0).await;
    add_item(&app, &user, &lunch, rice, 100.0).await;

    AxumTestRequest::post("/api/v1/weight")
        .bearer(&user.token)
        .json(&json!({"weight": 80.0}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let values: Value = AxumTestRequest::get(&format!("/api/v1/nutrition-plans/{plan}/values"))
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    // chicken 312.8 kcal + rice 125.5 kcal
    assert_close(&values["total"]["energy"], 438.3);
    assert_close(&values["total"]["protein"], 64.7);
    assert_close(&values["per_kg"]["protein"], 0.81);
    assert_eq!(values["meals"][0]["name"], "Lunch");
    assert_close(&values["meals"][0]["values"]["energy"], 438.3);

    let detail: Value = AxumTestRequest::get(&format!("/api/v1/nutrition-plans/{plan}"))
        .bearer(&user.token)
        .send(app.router())
        .await
        .json();
    assert_eq!(detail["description"], "Cut");
    assert_eq!(detail["meals"][0]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_meal_item_validation() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("root", UserRole::Admin).await;
    let bread = app.ingredient("Rye Bread", 8.0, 45.0, 2.0).await;
    let butter = app.ingredient("Butter", 0.9, 0.1, 81.0).await;
    let plan = create_plan(&app, &admin).await;
    let meal = create_meal(&app, &admin, &plan, "Breakfast").await;
    let uri = format!("/api/v1/meals/{meal}/items");

    let response = AxumTestRequest::post(&uri)
        .bearer(&admin.token)
        .json(&json!({"ingredient_id": bread, "amount": 0.0}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::post(&uri)
        .bearer(&admin.token)
        .json(&json!({"ingredient_id": bread, "amount": 1001.0}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);

    // A conversion of butter used together with bread
    let slice: Value = AxumTestRequest::post("/api/v1/weight-units")
        .bearer(&admin.token)
        .json(&json!({"name": "Pat"}))
        .send(app.router())
        .await
        .json();
    let butter_units = format!("/api/v1/ingredients/{butter}/weight-units");
    let butter_pat: Value = AxumTestRequest::post(&butter_units)
        .bearer(&admin.token)
        .json(&json!({"unit_id": slice["id"], "gram": 5.0}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let response = AxumTestRequest::post(&uri)
        .bearer(&admin.token)
        .json(&json!({"ingredient_id": bread, "weight_unit_id": butter_pat["id"], "amount": 2.0}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_logging_a_meal_fills_the_diary() {
    let app = TestApp::new().await;
    let user = app.user("eater").await;
    let oats = app.ingredient("Oats", 13.0, 60.0, 7.0).await;
    let milk = app.ingredient("Milk", 3.4, 4.8, 1.5).await;
    let plan = create_plan(&app, &user).await;
    let breakfast = create_meal(&app, &user, &plan, "Breakfast").await;
    add_item(&app, &user, &breakfast, oats, 80.0).await;
    add_item(&app, &user, &breakfast, milk, 250.0).await;
    let lunch = create_meal(&app, &user, &plan, "Lunch").await;
    add_item(&app, &user, &lunch, oats, 120.0).await;

    let logged: Vec<Value> = AxumTestRequest::post(&format!("/api/v1/meals/{breakfast}/log"))
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(logged.len(), 2);
    assert_eq!(logged[0]["ingredient_id"], oats.to_string());
    assert_eq!(logged[0]["amount"], 80.0);
    assert_eq!(logged[1]["ingredient_id"], milk.to_string());

    let today = Utc::now().date_naive();
    let diary: Vec<Value> = AxumTestRequest::get(&format!(
        "/api/v1/nutrition-plans/{plan}/diary?date={today}"
    ))
    .bearer(&user.token)
    .send(app.router())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(diary.len(), 2);

    let uri = format!("/api/v1/nutrition-plans/{plan}/diary/summary");
    let summary: Value = AxumTestRequest::get(&uri)
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let day = &summary[today.to_string()];
    assert!(day.is_object(), "missing {today} in {summary}");
    // oats 80 g: 10.4 g protein, milk 250 g: 8.5 g protein
    assert_close(&day["protein"], 18.9);
}

#[tokio::test]
async fn test_private_plan_is_not_readable_by_others() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let other = app.user("other").await;
    let plan = create_plan(&app, &owner).await;

    let response = AxumTestRequest::get(&format!("/api/v1/nutrition-plans/{plan}"))
        .bearer(&other.token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::post(&format!("/api/v1/nutrition-plans/{plan}/meals"))
        .bearer(&other.token)
        .json(&json!({"name": "Snack"}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_copy_plan_keeps_meals() {
    let app = TestApp::new().await;
    let user = app.user("eater").await;
    let rice = app.ingredient("Rice", 2.7, 28.0, 0.3).await;
    let plan = create_plan(&app, &user).await;
    let meal = create_meal(&app, &user, &plan, "Dinner").await;
    add_item(&app, &user, &meal, rice, 200.0).await;

    let copy: Value = AxumTestRequest::post(&format!("/api/v1/nutrition-plans/{plan}/copy"))
        .bearer(&user.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_ne!(copy["id"].as_str().unwrap(), plan);

    let detail: Value = AxumTestRequest::get(&format!(
        "/api/v1/nutrition-plans/{}",
        copy["id"].as_str().unwrap()
    ))
    .bearer(&user.token)
    .send(app.router())
    .await
    .json();
    assert_eq!(detail["meals"][0]["meal"]["name"], "Dinner");
    assert_eq!(detail["meals"][0]["items"][0]["amount"], 200.0);
}
