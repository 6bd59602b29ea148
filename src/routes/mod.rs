// ABOUTME: HTTP route modules of the workout manager REST API
// ABOUTME: Shared request helpers for authentication, ID parsing and data access checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Route modules
//!
//! Each domain exposes a `XRoutes` type with a `routes` constructor that
//! returns an axum [`Router`](axum::Router) bound to the shared
//! [`ServerResources`]. Handlers authenticate through the bearer token
//! middleware, then check access to the owning user's data with
//! [`Access::evaluate`].

/// Registration, login and guest accounts
pub mod auth;
/// Exercise catalog and moderation
pub mod exercises;
/// Social groups and memberships
pub mod groups;
/// Gyms, members, notes and contracts
pub mod gyms;
/// Liveness and readiness checks
pub mod health;
/// Ingredient catalog and weight units
pub mod ingredients;
/// Workout logs, sessions and calendar
pub mod logs;
/// Nutrition plans, meals and diary
pub mod nutrition;
/// Profile and body statistics
pub mod profile;
/// Training schedules
pub mod schedules;
/// Body weight entries and CSV import
pub mod weight;
/// Workouts, days, sets and settings
pub mod workouts;

pub use auth::AuthRoutes;
pub use exercises::ExerciseRoutes;
pub use groups::GroupRoutes;
pub use gyms::GymRoutes;
pub use health::HealthRoutes;
pub use ingredients::IngredientRoutes;
pub use logs::WorkoutLogRoutes;
pub use nutrition::NutritionRoutes;
pub use profile::ProfileRoutes;
pub use schedules::ScheduleRoutes;
pub use weight::WeightRoutes;
pub use workouts::WorkoutRoutes;

use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use workout_core::permissions::Access;

/// Authenticate the caller from the `Authorization` header
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<AuthResult> {
    resources.auth_middleware.authenticate_headers(headers).await
}

/// Parse a path or body identifier
pub(crate) fn parse_id(value: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::invalid_input(format!("Invalid {what} ID format")))
}

/// Access level of the caller to data owned by `owner_id`
pub(crate) async fn access_to(
    resources: &ServerResources,
    auth: &AuthResult,
    owner_id: Uuid,
) -> AppResult<Access> {
    if owner_id == auth.user_id {
        return Ok(Access::Full);
    }
    let owner = resources.database.users().data_owner(owner_id).await?;
    Ok(Access::evaluate(&auth.principal(), &owner))
}

pub(crate) async fn require_read(
    resources: &ServerResources,
    auth: &AuthResult,
    owner_id: Uuid,
) -> AppResult<()> {
    access_to(resources, auth, owner_id)
        .await?
        .require_read()
        .inspect_err(|_| log_denied(auth, owner_id))
}

pub(crate) async fn require_write(
    resources: &ServerResources,
    auth: &AuthResult,
    owner_id: Uuid,
) -> AppResult<()> {
    access_to(resources, auth, owner_id)
        .await?
        .require_write()
        .inspect_err(|_| log_denied(auth, owner_id))
}

fn log_denied(auth: &AuthResult, owner_id: Uuid) {
    AppLogger::log_access_denied(&auth.user_id.to_string(), "user_data", &owner_id.to_string());
}

/// Today's date in UTC
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Empty success response for deletes
pub(crate) fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Optional `user_id` query parameter selecting whose data to read
///
/// Trainers and gym managers pass it to look at a member's data; everyone
/// else reads their own.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwnerQuery {
    pub user_id: Option<String>,
}

impl OwnerQuery {
    /// Resolve the target user and check read access
    pub(crate) async fn readable_owner(
        &self,
        resources: &ServerResources,
        auth: &AuthResult,
    ) -> AppResult<Uuid> {
        let owner_id = match &self.user_id {
            Some(id) => parse_id(id, "user")?,
            None => auth.user_id,
        };
        require_read(resources, auth, owner_id).await?;
        Ok(owner_id)
    }
}

/// Reject blank or overlong names
pub(crate) fn validate_name(field: &str, value: &str) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_field(field, "This field may not be blank"));
    }
    if trimmed.chars().count() > workout_core::constants::limits::MAX_NAME_LENGTH {
        return Err(AppError::invalid_field(
            field,
            format!(
                "Ensure this field has no more than {} characters",
                workout_core::constants::limits::MAX_NAME_LENGTH
            ),
        ));
    }
    Ok(())
}
