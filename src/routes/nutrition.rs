// ABOUTME: Nutrition plan routes for meals, meal items, nutritional values and the diary
// ABOUTME: Plan values and daily diary totals are aggregated from the ingredient catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Nutrition routes
//!
//! Plans own meals, meals own items, and diary entries hang directly off the
//! plan. Values are always computed on request from the current ingredient
//! data; nothing aggregated is stored.

use super::{authenticate, no_content, parse_id, require_read, require_write, OwnerQuery};
use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;
use workout_core::body_stats::to_kilograms;
use workout_core::constants::limits;
use workout_core::models::{Meal, MealItem, MealWithItems, NutritionLogItem, NutritionPlan};
use workout_core::nutrition::{daily_log_totals, summarize_plan, NutritionalValues, PlanNutrition};

/// Plan fields
#[derive(Debug, Default, Deserialize)]
pub struct PlanRequest {
    /// Description
    #[serde(default)]
    pub description: String,
    /// Whether the plan sets an explicit calorie goal
    #[serde(default)]
    pub has_goal_calories: bool,
}

/// Meal fields
#[derive(Debug, Deserialize)]
pub struct MealRequest {
    /// Name
    #[serde(default)]
    pub name: String,
    /// Time of day
    pub time: Option<NaiveTime>,
    /// Position, appended when absent
    pub order: Option<u32>,
}

/// Meal item or diary entry fields
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    /// Ingredient
    pub ingredient_id: Uuid,
    /// Ingredient weight unit, grams when absent
    pub weight_unit_id: Option<Uuid>,
    /// Amount in grams or units
    pub amount: f64,
    /// Position of a meal item, appended when absent
    pub order: Option<u32>,
    /// Time of a diary entry, defaults to now
    pub datetime: Option<DateTime<Utc>>,
}

/// Diary filter
#[derive(Debug, Default, Deserialize)]
pub struct DiaryQuery {
    /// Only entries of this day
    pub date: Option<NaiveDate>,
}

/// Plan with its meals and items
#[derive(Debug, Serialize)]
pub struct PlanDetail {
    /// Plan
    #[serde(flatten)]
    pub plan: NutritionPlan,
    /// Meals in order with their items
    pub meals: Vec<MealWithItems>,
}

/// Nutrition routes
pub struct NutritionRoutes;

impl NutritionRoutes {
    /// Create the nutrition routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/v1/nutrition-plans",
                get(Self::handle_list_plans).post(Self::handle_create_plan),
            )
            .route(
                "/api/v1/nutrition-plans/:id",
                get(Self::handle_get_plan)
                    .put(Self::handle_update_plan)
                    .delete(Self::handle_delete_plan),
            )
            .route("/api/v1/nutrition-plans/:id/values", get(Self::handle_plan_values))
            .route("/api/v1/nutrition-plans/:id/copy", post(Self::handle_copy_plan))
            .route("/api/v1/nutrition-plans/:id/meals", post(Self::handle_create_meal))
            .route(
                "/api/v1/nutrition-plans/:id/diary",
                get(Self::handle_list_diary).post(Self::handle_create_diary_entry),
            )
            .route(
                "/api/v1/nutrition-plans/:id/diary/summary",
                get(Self::handle_diary_summary),
            )
            .route(
                "/api/v1/meals/:id",
                put(Self::handle_update_meal).delete(Self::handle_delete_meal),
            )
            .route("/api/v1/meals/:id/items", post(Self::handle_create_item))
            .route("/api/v1/meals/:id/log", post(Self::handle_log_meal))
            .route(
                "/api/v1/meal-items/:id",
                put(Self::handle_update_item).delete(Self::handle_delete_item),
            )
            .route(
                "/api/v1/diary/:id",
                put(Self::handle_update_diary_entry).delete(Self::handle_delete_diary_entry),
            )
            .with_state(resources)
    }

    // ========================================================================
    // Ownership lookups and validation
    // ========================================================================

    async fn load_plan(resources: &ServerResources, id: Uuid) -> AppResult<NutritionPlan> {
        resources
            .database
            .nutrition()
            .get_plan(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Nutrition plan {id}")))
    }

    async fn readable_plan(
        resources: &ServerResources,
        auth: &AuthResult,
        id: &str,
    ) -> AppResult<NutritionPlan> {
        let plan = Self::load_plan(resources, parse_id(id, "nutrition plan")?).await?;
        require_read(resources, auth, plan.user_id).await?;
        Ok(plan)
    }

    async fn writable_plan(
        resources: &ServerResources,
        auth: &AuthResult,
        id: Uuid,
    ) -> AppResult<NutritionPlan> {
        let plan = Self::load_plan(resources, id).await?;
        require_write(resources, auth, plan.user_id).await?;
        Ok(plan)
    }

    async fn writable_meal(
        resources: &ServerResources,
        auth: &AuthResult,
        id: Uuid,
    ) -> AppResult<Meal> {
        let meal = resources
            .database
            .nutrition()
            .get_meal(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Meal {id}")))?;
        Self::writable_plan(resources, auth, meal.plan_id).await?;
        Ok(meal)
    }

    /// Check amount, ingredient and that the weight unit belongs to the ingredient
    async fn validate_item(resources: &ServerResources, body: &ItemRequest) -> AppResult<()> {
        if !(body.amount > 0.0 && body.amount <= limits::MAX_MEAL_ITEM_AMOUNT) {
            return Err(AppError::out_of_range(
                "amount",
                0.0,
                limits::MAX_MEAL_ITEM_AMOUNT,
            ));
        }
        let ingredients = resources.database.ingredients();
        ingredients
            .get_ingredient(body.ingredient_id)
            .await?
            .ok_or_else(|| AppError::invalid_field("ingredient_id", "Unknown ingredient"))?;
        if let Some(unit_id) = body.weight_unit_id {
            let unit = ingredients
                .get_ingredient_unit(unit_id)
                .await?
                .ok_or_else(|| AppError::invalid_field("weight_unit_id", "Unknown weight unit"))?;
            if unit.ingredient_id != body.ingredient_id {
                return Err(AppError::invalid_field(
                    "weight_unit_id",
                    "The weight unit does not belong to the ingredient",
                ));
            }
        }
        Ok(())
    }

    /// Latest body weight of the plan owner in kilograms
    async fn body_weight_kg(resources: &ServerResources, user_id: Uuid) -> AppResult<Option<f64>> {
        let Some(entry) = resources.database.weight().latest_entry(user_id).await? else {
            return Ok(None);
        };
        let unit = resources.database.users().get_profile(user_id).await?.weight_unit;
        Ok(Some(to_kilograms(entry.weight, unit)))
    }

    // ========================================================================
    // Plans
    // ========================================================================

    async fn handle_list_plans(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = query.readable_owner(&resources, &auth).await?;
        let plans = resources.database.nutrition().list_plans(owner_id).await?;
        Ok((StatusCode::OK, Json(plans)).into_response())
    }

    async fn handle_create_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<PlanRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let plan = NutritionPlan {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            description: body.description.trim().to_owned(),
            created: Utc::now().date_naive(),
            has_goal_calories: body.has_goal_calories,
        };
        resources.database.nutrition().create_plan(&plan).await?;
        Ok((StatusCode::CREATED, Json(plan)).into_response())
    }

    async fn handle_get_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let plan = Self::readable_plan(&resources, &auth, &id).await?;
        let meals = resources.database.nutrition().meals_with_items(plan.id).await?;
        Ok((StatusCode::OK, Json(PlanDetail { plan, meals })).into_response())
    }

    async fn handle_update_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<PlanRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut plan =
            Self::writable_plan(&resources, &auth, parse_id(&id, "nutrition plan")?).await?;
        plan.description = body.description.trim().to_owned();
        plan.has_goal_calories = body.has_goal_calories;
        resources.database.nutrition().update_plan(&plan).await?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    async fn handle_delete_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let plan = Self::writable_plan(&resources, &auth, parse_id(&id, "nutrition plan")?).await?;
        resources.database.nutrition().delete_plan(plan.id).await?;
        Ok(no_content())
    }

    /// Handle GET /api/v1/nutrition-plans/:id/values
    async fn handle_plan_values(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let plan = Self::readable_plan(&resources, &auth, &id).await?;

        let meals = resources.database.nutrition().meals_with_items(plan.id).await?;
        let mut ingredient_ids: Vec<Uuid> = meals
            .iter()
            .flat_map(|m| m.items.iter().map(|i| i.ingredient_id))
            .collect();
        ingredient_ids.sort_unstable();
        ingredient_ids.dedup();
        let catalog = resources.database.ingredients().load_catalog(&ingredient_ids).await?;
        let weight = Self::body_weight_kg(&resources, plan.user_id).await?;

        let values: PlanNutrition = summarize_plan(&catalog, &meals, weight);
        Ok((StatusCode::OK, Json(values)).into_response())
    }

    /// Handle POST /api/v1/nutrition-plans/:id/copy
    async fn handle_copy_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let plan = Self::readable_plan(&resources, &auth, &id).await?;
        let copy = resources
            .database
            .nutrition()
            .copy_plan(plan.id, auth.user_id)
            .await?;
        tracing::info!(source = %plan.id, copy = %copy.id, "Copied nutrition plan");
        Ok((StatusCode::CREATED, Json(copy)).into_response())
    }

    // ========================================================================
    // Meals
    // ========================================================================

    async fn handle_create_meal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<MealRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let plan = Self::writable_plan(&resources, &auth, parse_id(&id, "nutrition plan")?).await?;

        let nutrition = resources.database.nutrition();
        let order = match body.order {
            Some(order) => order,
            None => nutrition.next_meal_order(plan.id).await?,
        };
        let meal = Meal {
            id: Uuid::new_v4(),
            plan_id: plan.id,
            order,
            time: body.time,
            name: body.name.trim().to_owned(),
        };
        nutrition.create_meal(&meal).await?;
        Ok((StatusCode::CREATED, Json(meal)).into_response())
    }

    async fn handle_update_meal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<MealRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut meal = Self::writable_meal(&resources, &auth, parse_id(&id, "meal")?).await?;
        meal.name = body.name.trim().to_owned();
        meal.time = body.time;
        if let Some(order) = body.order {
            meal.order = order;
        }
        resources.database.nutrition().update_meal(&meal).await?;
        Ok((StatusCode::OK, Json(meal)).into_response())
    }

    async fn handle_delete_meal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let meal = Self::writable_meal(&resources, &auth, parse_id(&id, "meal")?).await?;
        resources.database.nutrition().delete_meal(meal.id).await?;
        Ok(no_content())
    }

    /// Handle POST /api/v1/meals/:id/log - copy every item of a meal into the diary
    async fn handle_log_meal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let meal = Self::writable_meal(&resources, &auth, parse_id(&id, "meal")?).await?;

        let logged = resources
            .database
            .nutrition()
            .log_meal(&meal, Utc::now())
            .await?;
        Ok((StatusCode::CREATED, Json(logged)).into_response())
    }

    // ========================================================================
    // Meal items
    // ========================================================================

    async fn handle_create_item(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<ItemRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let meal = Self::writable_meal(&resources, &auth, parse_id(&id, "meal")?).await?;
        Self::validate_item(&resources, &body).await?;

        let nutrition = resources.database.nutrition();
        let order = match body.order {
            Some(order) => order,
            None => nutrition.next_item_order(meal.id).await?,
        };
        let item = MealItem {
            id: Uuid::new_v4(),
            meal_id: meal.id,
            ingredient_id: body.ingredient_id,
            weight_unit_id: body.weight_unit_id,
            order,
            amount: body.amount,
        };
        nutrition.create_item(&item).await?;
        Ok((StatusCode::CREATED, Json(item)).into_response())
    }

    async fn writable_item(
        resources: &ServerResources,
        auth: &AuthResult,
        id: &str,
    ) -> AppResult<MealItem> {
        let item = resources
            .database
            .nutrition()
            .get_item(parse_id(id, "meal item")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Meal item {id}")))?;
        Self::writable_meal(resources, auth, item.meal_id).await?;
        Ok(item)
    }

    async fn handle_update_item(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<ItemRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut item = Self::writable_item(&resources, &auth, &id).await?;
        Self::validate_item(&resources, &body).await?;

        item.ingredient_id = body.ingredient_id;
        item.weight_unit_id = body.weight_unit_id;
        item.amount = body.amount;
        if let Some(order) = body.order {
            item.order = order;
        }
        resources.database.nutrition().update_item(&item).await?;
        Ok((StatusCode::OK, Json(item)).into_response())
    }

    async fn handle_delete_item(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let item = Self::writable_item(&resources, &auth, &id).await?;
        resources.database.nutrition().delete_item(item.id).await?;
        Ok(no_content())
    }

    // ========================================================================
    // Diary
    // ========================================================================

    async fn handle_list_diary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Query(query): Query<DiaryQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let plan = Self::readable_plan(&resources, &auth, &id).await?;
        let items = resources
            .database
            .nutrition()
            .list_log_items(plan.id, query.date)
            .await?;
        Ok((StatusCode::OK, Json(items)).into_response())
    }

    async fn handle_create_diary_entry(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<ItemRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let plan = Self::writable_plan(&resources, &auth, parse_id(&id, "nutrition plan")?).await?;
        Self::validate_item(&resources, &body).await?;

        let entry = NutritionLogItem {
            id: Uuid::new_v4(),
            plan_id: plan.id,
            datetime: body.datetime.unwrap_or_else(Utc::now),
            ingredient_id: body.ingredient_id,
            weight_unit_id: body.weight_unit_id,
            amount: body.amount,
        };
        resources.database.nutrition().create_log_item(&entry).await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    /// Handle GET /api/v1/nutrition-plans/:id/diary/summary - values per logged day
    async fn handle_diary_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let plan = Self::readable_plan(&resources, &auth, &id).await?;

        let items = resources.database.nutrition().list_log_items(plan.id, None).await?;
        let mut ingredient_ids: Vec<Uuid> = items.iter().map(|i| i.ingredient_id).collect();
        ingredient_ids.sort_unstable();
        ingredient_ids.dedup();
        let catalog = resources.database.ingredients().load_catalog(&ingredient_ids).await?;

        let totals: BTreeMap<NaiveDate, NutritionalValues> = daily_log_totals(&catalog, &items);
        Ok((StatusCode::OK, Json(totals)).into_response())
    }

    async fn writable_diary_entry(
        resources: &ServerResources,
        auth: &AuthResult,
        id: &str,
    ) -> AppResult<NutritionLogItem> {
        let entry = resources
            .database
            .nutrition()
            .get_log_item(parse_id(id, "diary entry")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Diary entry {id}")))?;
        Self::writable_plan(resources, auth, entry.plan_id).await?;
        Ok(entry)
    }

    async fn handle_update_diary_entry(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<ItemRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut entry = Self::writable_diary_entry(&resources, &auth, &id).await?;
        Self::validate_item(&resources, &body).await?;

        entry.ingredient_id = body.ingredient_id;
        entry.weight_unit_id = body.weight_unit_id;
        entry.amount = body.amount;
        if let Some(datetime) = body.datetime {
            entry.datetime = datetime;
        }
        resources.database.nutrition().update_log_item(&entry).await?;
        Ok((StatusCode::OK, Json(entry)).into_response())
    }

    async fn handle_delete_diary_entry(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let entry = Self::writable_diary_entry(&resources, &auth, &id).await?;
        resources.database.nutrition().delete_log_item(entry.id).await?;
        Ok(no_content())
    }
}
