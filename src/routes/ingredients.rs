// ABOUTME: Ingredient catalog routes with weight units, per-ingredient conversions and moderation
// ABOUTME: Computes nutritional values of an amount of one ingredient
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{authenticate, no_content, parse_id, validate_name};
use crate::auth::AuthResult;
use crate::database::ingredients::DEFAULT_PAGE_SIZE;
use crate::database::IngredientFilter;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use workout_core::constants::{defaults, limits};
use workout_core::models::{Ingredient, IngredientWeightUnit, ModerationStatus};
use workout_core::nutrition::{validate_ingredient, IngredientCatalog, NutritionalValues};
use workout_core::permissions::Permissions;

const MAX_PAGE_SIZE: u32 = 500;

/// New weight unit
#[derive(Debug, Deserialize)]
pub struct WeightUnitRequest {
    /// Name such as `slice` or `cup`
    pub name: String,
    /// Language short name, defaults to the default language
    pub language: Option<String>,
}

/// Ingredient listing filters
#[derive(Debug, Default, Deserialize)]
pub struct IngredientQuery {
    /// Review state, defaults to `accepted`
    pub status: Option<ModerationStatus>,
    /// Language short name
    pub language: Option<String>,
    /// Name fragment
    pub search: Option<String>,
    /// Page size
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: Option<u32>,
}

/// Ingredient fields, values per 100 g
#[derive(Debug, Deserialize)]
pub struct IngredientRequest {
    /// Name
    pub name: String,
    /// Language short name, defaults to the default language
    pub language: Option<String>,
    /// Energy in kcal
    pub energy: f64,
    /// Protein in g
    pub protein: f64,
    /// Carbohydrates in g
    pub carbohydrates: f64,
    /// Sugar in g
    pub carbohydrates_sugar: Option<f64>,
    /// Fat in g
    pub fat: f64,
    /// Saturated fat in g
    pub fat_saturated: Option<f64>,
    /// Fibre in g
    pub fibre: Option<f64>,
    /// Sodium in g
    pub sodium: Option<f64>,
    /// Author credited by the license
    pub license_author: Option<String>,
}

/// Conversion from a weight unit to grams
#[derive(Debug, Deserialize)]
pub struct IngredientUnitRequest {
    /// Weight unit
    pub unit_id: Uuid,
    /// Grams of one unit
    pub gram: f64,
    /// Multiplier, defaults to 1
    pub amount: Option<f64>,
}

/// Amount to compute values for
#[derive(Debug, Deserialize)]
pub struct ValuesQuery {
    /// Amount in grams or in units
    pub amount: f64,
    /// Ingredient weight unit, grams when absent
    pub unit: Option<String>,
}

/// Ingredient routes
pub struct IngredientRoutes;

impl IngredientRoutes {
    /// Create the ingredient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/v1/weight-units",
                get(Self::handle_list_weight_units).post(Self::handle_create_weight_unit),
            )
            .route("/api/v1/weight-units/:id", delete(Self::handle_delete_weight_unit))
            .route(
                "/api/v1/ingredients",
                get(Self::handle_list_ingredients).post(Self::handle_submit_ingredient),
            )
            .route(
                "/api/v1/ingredients/:id",
                get(Self::handle_get_ingredient)
                    .put(Self::handle_update_ingredient)
                    .delete(Self::handle_delete_ingredient),
            )
            .route("/api/v1/ingredients/:id/accept", post(Self::handle_accept))
            .route("/api/v1/ingredients/:id/decline", post(Self::handle_decline))
            .route("/api/v1/ingredients/:id/values", get(Self::handle_values))
            .route(
                "/api/v1/ingredients/:id/weight-units",
                get(Self::handle_list_ingredient_units).post(Self::handle_create_ingredient_unit),
            )
            .route(
                "/api/v1/ingredient-weight-units/:id",
                put(Self::handle_update_ingredient_unit)
                    .delete(Self::handle_delete_ingredient_unit),
            )
            .with_state(resources)
    }

    async fn authenticate_manager(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> AppResult<AuthResult> {
        let auth = authenticate(headers, resources).await?;
        auth.principal().require(Permissions::MANAGE_INGREDIENTS)?;
        Ok(auth)
    }

    async fn language_id(resources: &ServerResources, short_name: Option<&str>) -> AppResult<Uuid> {
        let exercises = resources.database.exercises();
        let language = match short_name {
            Some(short_name) => exercises
                .get_language_by_short_name(short_name)
                .await?
                .ok_or_else(|| AppError::invalid_field("language", "Unknown language"))?,
            None => exercises.default_language().await?,
        };
        Ok(language.id)
    }

    async fn load_ingredient(resources: &ServerResources, id: &str) -> AppResult<Ingredient> {
        resources
            .database
            .ingredients()
            .get_ingredient(parse_id(id, "ingredient")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))
    }

    fn validate_unit(body: &IngredientUnitRequest) -> AppResult<f64> {
        if body.gram <= 0.0 {
            return Err(AppError::invalid_field("gram", "Grams must be greater than zero"));
        }
        let amount = body.amount.unwrap_or(defaults::WEIGHT_UNIT_AMOUNT);
        if amount <= 0.0 {
            return Err(AppError::invalid_field("amount", "Amount must be greater than zero"));
        }
        Ok(amount)
    }

    // ========================================================================
    // Weight units
    // ========================================================================

    async fn handle_list_weight_units(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let units = resources.database.ingredients().list_weight_units().await?;
        Ok((StatusCode::OK, Json(units)).into_response())
    }

    async fn handle_create_weight_unit(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<WeightUnitRequest>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        validate_name("name", &body.name)?;
        let language_id = Self::language_id(&resources, body.language.as_deref()).await?;
        let unit = resources
            .database
            .ingredients()
            .create_weight_unit(language_id, body.name.trim())
            .await?;
        Ok((StatusCode::CREATED, Json(unit)).into_response())
    }

    async fn handle_delete_weight_unit(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        resources
            .database
            .ingredients()
            .delete_weight_unit(parse_id(&id, "weight unit")?)
            .await?;
        Ok(no_content())
    }

    // ========================================================================
    // Ingredients
    // ========================================================================

    /// Handle GET /api/v1/ingredients
    async fn handle_list_ingredients(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<IngredientQuery>,
    ) -> Result<Response, AppError> {
        let status = query.status.unwrap_or(ModerationStatus::Accepted);
        if status != ModerationStatus::Accepted {
            Self::authenticate_manager(&headers, &resources).await?;
        }
        let language_id = match query.language.as_deref() {
            Some(short_name) => Some(Self::language_id(&resources, Some(short_name)).await?),
            None => None,
        };

        let filter = IngredientFilter {
            status: Some(status),
            language_id,
            search: query.search.filter(|s| !s.trim().is_empty()),
            limit: Some(query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)),
            offset: query.offset,
        };
        let ingredients = resources.database.ingredients().list_ingredients(&filter).await?;
        Ok((StatusCode::OK, Json(ingredients)).into_response())
    }

    async fn handle_get_ingredient(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let ingredient = Self::load_ingredient(&resources, &id).await?;
        if ingredient.status != ModerationStatus::Accepted {
            let auth = authenticate(&headers, &resources).await?;
            if ingredient.author_id != Some(auth.user_id) {
                auth.principal().require(Permissions::MANAGE_INGREDIENTS)?;
            }
        }
        Ok((StatusCode::OK, Json(ingredient)).into_response())
    }

    fn apply(ingredient: &mut Ingredient, body: IngredientRequest, language_id: Uuid) {
        ingredient.name = body.name.trim().to_owned();
        ingredient.language_id = language_id;
        ingredient.energy = body.energy;
        ingredient.protein = body.protein;
        ingredient.carbohydrates = body.carbohydrates;
        ingredient.carbohydrates_sugar = body.carbohydrates_sugar;
        ingredient.fat = body.fat;
        ingredient.fat_saturated = body.fat_saturated;
        ingredient.fibre = body.fibre;
        ingredient.sodium = body.sodium;
        if body.license_author.is_some() {
            ingredient.license_author = body.license_author;
        }
        ingredient.updated_at = Utc::now();
    }

    /// Handle POST /api/v1/ingredients - submit an ingredient for review
    async fn handle_submit_ingredient(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<IngredientRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        validate_name("name", &body.name)?;
        let language_id = Self::language_id(&resources, body.language.as_deref()).await?;

        let now = Utc::now();
        let mut ingredient = Ingredient {
            id: Uuid::new_v4(),
            language_id,
            name: String::new(),
            energy: 0.0,
            protein: 0.0,
            carbohydrates: 0.0,
            carbohydrates_sugar: None,
            fat: 0.0,
            fat_saturated: None,
            fibre: None,
            sodium: None,
            status: if auth.principal().has(Permissions::MANAGE_INGREDIENTS) {
                ModerationStatus::Accepted
            } else {
                ModerationStatus::Pending
            },
            license_author: Some(auth.username.clone()),
            author_id: Some(auth.user_id),
            created_at: now,
            updated_at: now,
        };
        Self::apply(&mut ingredient, body, language_id);
        validate_ingredient(&ingredient)?;
        resources.database.ingredients().create_ingredient(&ingredient).await?;

        info!(
            ingredient_id = %ingredient.id,
            status = ingredient.status.as_str(),
            "Ingredient submitted"
        );
        Ok((StatusCode::CREATED, Json(ingredient)).into_response())
    }

    async fn handle_update_ingredient(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<IngredientRequest>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        let mut ingredient = Self::load_ingredient(&resources, &id).await?;
        validate_name("name", &body.name)?;
        let language_id = Self::language_id(&resources, body.language.as_deref()).await?;

        Self::apply(&mut ingredient, body, language_id);
        validate_ingredient(&ingredient)?;
        resources.database.ingredients().update_ingredient(&ingredient).await?;
        Ok((StatusCode::OK, Json(ingredient)).into_response())
    }

    async fn handle_delete_ingredient(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        resources
            .database
            .ingredients()
            .delete_ingredient(parse_id(&id, "ingredient")?)
            .await?;
        Ok(no_content())
    }

    async fn moderate(
        resources: &ServerResources,
        id: &str,
        status: ModerationStatus,
    ) -> Result<Response, AppError> {
        let ingredient_id = parse_id(id, "ingredient")?;
        resources
            .database
            .ingredients()
            .set_status(ingredient_id, status)
            .await?;
        let ingredient = Self::load_ingredient(resources, id).await?;
        info!(ingredient_id = %ingredient_id, status = status.as_str(), "Ingredient reviewed");
        Ok((StatusCode::OK, Json(ingredient)).into_response())
    }

    async fn handle_accept(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        Self::moderate(&resources, &id, ModerationStatus::Accepted).await
    }

    async fn handle_decline(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        Self::moderate(&resources, &id, ModerationStatus::Declined).await
    }

    /// Handle GET /api/v1/ingredients/:id/values?amount=&unit=
    async fn handle_values(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Query(query): Query<ValuesQuery>,
    ) -> Result<Response, AppError> {
        if !(query.amount > 0.0 && query.amount <= limits::MAX_MEAL_ITEM_AMOUNT) {
            return Err(AppError::out_of_range(
                "amount",
                0.0,
                limits::MAX_MEAL_ITEM_AMOUNT,
            ));
        }
        let ingredient = Self::load_ingredient(&resources, &id).await?;
        let ingredients = resources.database.ingredients();
        let unit = match query.unit.as_deref() {
            Some(unit_id) => {
                let unit = ingredients
                    .get_ingredient_unit(parse_id(unit_id, "weight unit")?)
                    .await?
                    .filter(|u| u.ingredient_id == ingredient.id)
                    .ok_or_else(|| {
                        AppError::invalid_field("unit", "Unknown weight unit for this ingredient")
                    })?;
                Some(unit)
            }
            None => None,
        };

        let unit_id = unit.as_ref().map(|u| u.id);
        let ingredient_id = ingredient.id;
        let catalog = IngredientCatalog::new([ingredient], unit);
        let values: NutritionalValues = catalog
            .values_for(ingredient_id, unit_id, query.amount)
            .rounded();
        Ok((StatusCode::OK, Json(values)).into_response())
    }

    // ========================================================================
    // Ingredient weight units
    // ========================================================================

    async fn handle_list_ingredient_units(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let ingredient_id = parse_id(&id, "ingredient")?;
        let units = resources
            .database
            .ingredients()
            .list_ingredient_units(ingredient_id)
            .await?;
        Ok((StatusCode::OK, Json(units)).into_response())
    }

    async fn handle_create_ingredient_unit(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<IngredientUnitRequest>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        let ingredient = Self::load_ingredient(&resources, &id).await?;
        let amount = Self::validate_unit(&body)?;
        let ingredients = resources.database.ingredients();
        ingredients
            .get_weight_unit(body.unit_id)
            .await?
            .ok_or_else(|| AppError::invalid_field("unit_id", "Unknown weight unit"))?;

        let unit = IngredientWeightUnit {
            id: Uuid::new_v4(),
            ingredient_id: ingredient.id,
            unit_id: body.unit_id,
            gram: body.gram,
            amount,
        };
        ingredients.create_ingredient_unit(&unit).await?;
        Ok((StatusCode::CREATED, Json(unit)).into_response())
    }

    async fn handle_update_ingredient_unit(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<IngredientUnitRequest>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        let ingredients = resources.database.ingredients();
        let mut unit = ingredients
            .get_ingredient_unit(parse_id(&id, "ingredient weight unit")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient weight unit {id}")))?;
        unit.amount = Self::validate_unit(&body)?;
        ingredients
            .get_weight_unit(body.unit_id)
            .await?
            .ok_or_else(|| AppError::invalid_field("unit_id", "Unknown weight unit"))?;

        unit.unit_id = body.unit_id;
        unit.gram = body.gram;
        ingredients.update_ingredient_unit(&unit).await?;
        Ok((StatusCode::OK, Json(unit)).into_response())
    }

    async fn handle_delete_ingredient_unit(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        resources
            .database
            .ingredients()
            .delete_ingredient_unit(parse_id(&id, "ingredient weight unit")?)
            .await?;
        Ok(no_content())
    }
}
