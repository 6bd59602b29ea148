// ABOUTME: Workout routine routes for workouts, training days, exercise sets and settings
// ABOUTME: Also serves the nested canonical representation and workout copies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Workout routes
//!
//! A workout owns days, a day owns sets and a set owns settings. Every child
//! route walks up to the workout to find the owning user before checking
//! access.

use super::{
    authenticate, no_content, parse_id, require_read, require_write, validate_name, OwnerQuery,
};
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
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use workout_core::constants::{defaults, limits};
use workout_core::models::{Day, DayOfWeek, ExerciseSet, Setting, Workout};
use workout_core::routine::{build_canonical, validate_days_of_week};

/// Workout name
#[derive(Debug, Deserialize)]
pub struct WorkoutRequest {
    /// Name
    pub name: String,
}

/// Copy options
#[derive(Debug, Default, Deserialize)]
pub struct CopyWorkoutRequest {
    /// Name of the copy, defaults to the source name
    pub name: Option<String>,
}

/// Training day fields
#[derive(Debug, Deserialize)]
pub struct DayRequest {
    /// Description
    pub description: String,
    /// Weekdays, Monday is 1
    pub days_of_week: Vec<DayOfWeek>,
}

/// Exercise set fields
#[derive(Debug, Deserialize)]
pub struct SetRequest {
    /// Number of sets
    pub sets: Option<u32>,
    /// Position within the day, appended when absent
    pub order: Option<u32>,
    /// Exercises done in this set, in order
    pub exercises: Vec<Uuid>,
}

/// Repetition setting fields
#[derive(Debug, Deserialize)]
pub struct SettingRequest {
    /// Exercise, must be part of the set
    pub exercise_id: Uuid,
    /// Target repetitions, 99 means until failure
    pub reps: u32,
    /// Target weight
    pub weight: Option<f64>,
    /// Reps in reserve
    pub rir: Option<f64>,
    /// Position among the settings of the exercise
    pub order: Option<u32>,
    /// Free text
    #[serde(default)]
    pub comment: String,
}

/// Workout routes
pub struct WorkoutRoutes;

impl WorkoutRoutes {
    /// Create the workout routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/v1/workouts",
                get(Self::handle_list_workouts).post(Self::handle_create_workout),
            )
            .route(
                "/api/v1/workouts/:id",
                get(Self::handle_get_workout)
                    .put(Self::handle_rename_workout)
                    .delete(Self::handle_delete_workout),
            )
            .route("/api/v1/workouts/:id/canonical", get(Self::handle_canonical))
            .route("/api/v1/workouts/:id/copy", post(Self::handle_copy_workout))
            .route(
                "/api/v1/workouts/:id/days",
                get(Self::handle_list_days).post(Self::handle_create_day),
            )
            .route(
                "/api/v1/days/:id",
                put(Self::handle_update_day).delete(Self::handle_delete_day),
            )
            .route("/api/v1/days/:id/sets", post(Self::handle_create_set))
            .route(
                "/api/v1/sets/:id",
                put(Self::handle_update_set).delete(Self::handle_delete_set),
            )
            .route("/api/v1/sets/:id/settings", post(Self::handle_create_setting))
            .route(
                "/api/v1/settings/:id",
                put(Self::handle_update_setting).delete(Self::handle_delete_setting),
            )
            .with_state(resources)
    }

    // ========================================================================
    // Ownership lookups
    // ========================================================================

    async fn load_workout(resources: &ServerResources, id: Uuid) -> AppResult<Workout> {
        resources
            .database
            .workouts()
            .get_workout(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Workout {id}")))
    }

    async fn writable_day(
        resources: &ServerResources,
        auth: &AuthResult,
        day_id: Uuid,
    ) -> AppResult<Day> {
        let day = resources
            .database
            .workouts()
            .get_day(day_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Day {day_id}")))?;
        let workout = Self::load_workout(resources, day.workout_id).await?;
        require_write(resources, auth, workout.user_id).await?;
        Ok(day)
    }

    async fn writable_set(
        resources: &ServerResources,
        auth: &AuthResult,
        set_id: Uuid,
    ) -> AppResult<(ExerciseSet, Day)> {
        let set = resources
            .database
            .workouts()
            .get_set(set_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Set {set_id}")))?;
        let day = Self::writable_day(resources, auth, set.day_id).await?;
        Ok((set, day))
    }

    // ========================================================================
    // Validation
    // ========================================================================

    async fn validate_set(resources: &ServerResources, body: &SetRequest) -> AppResult<u32> {
        let sets = body.sets.unwrap_or(defaults::SETS);
        if !(limits::MIN_SETS..=limits::MAX_SETS).contains(&sets) {
            return Err(AppError::out_of_range(
                "sets",
                f64::from(limits::MIN_SETS),
                f64::from(limits::MAX_SETS),
            ));
        }
        if body.exercises.is_empty() {
            return Err(AppError::invalid_field("exercises", "Select at least one exercise"));
        }
        let known = resources
            .database
            .exercises()
            .exercises_by_id(&body.exercises)
            .await?;
        if let Some(unknown) = body.exercises.iter().find(|id| !known.contains_key(*id)) {
            return Err(AppError::invalid_field(
                "exercises",
                format!("Unknown exercise {unknown}"),
            ));
        }
        Ok(sets)
    }

    fn validate_setting(set: &ExerciseSet, body: &SettingRequest) -> AppResult<()> {
        if !set.exercises.contains(&body.exercise_id) {
            return Err(AppError::invalid_field(
                "exercise_id",
                "The exercise is not part of this set",
            ));
        }
        if body.reps > limits::MAX_REPS {
            return Err(AppError::out_of_range("reps", 0.0, f64::from(limits::MAX_REPS)));
        }
        if body.weight.is_some_and(|w| w < 0.0) {
            return Err(AppError::invalid_field("weight", "Weight may not be negative"));
        }
        if body.rir.is_some_and(|r| !(0.0..=limits::MAX_RIR).contains(&r)) {
            return Err(AppError::out_of_range("rir", 0.0, limits::MAX_RIR));
        }
        Ok(())
    }

    // ========================================================================
    // Workouts
    // ========================================================================

    /// Handle GET /api/v1/workouts
    async fn handle_list_workouts(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = query.readable_owner(&resources, &auth).await?;
        let workouts = resources.database.workouts().list_workouts(owner_id).await?;
        Ok((StatusCode::OK, Json(workouts)).into_response())
    }

    /// Handle POST /api/v1/workouts
    async fn handle_create_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<WorkoutRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        validate_name("name", &body.name)?;
        let workout = resources
            .database
            .workouts()
            .create_workout(auth.user_id, body.name.trim())
            .await?;
        Ok((StatusCode::CREATED, Json(workout)).into_response())
    }

    /// Handle GET /api/v1/workouts/:id
    async fn handle_get_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let workout = Self::load_workout(&resources, parse_id(&id, "workout")?).await?;
        require_read(&resources, &auth, workout.user_id).await?;
        Ok((StatusCode::OK, Json(workout)).into_response())
    }

    /// Handle PUT /api/v1/workouts/:id
    async fn handle_rename_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<WorkoutRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut workout = Self::load_workout(&resources, parse_id(&id, "workout")?).await?;
        require_write(&resources, &auth, workout.user_id).await?;
        validate_name("name", &body.name)?;

        workout.name = body.name.trim().to_owned();
        resources
            .database
            .workouts()
            .rename_workout(workout.id, &workout.name)
            .await?;
        Ok((StatusCode::OK, Json(workout)).into_response())
    }

    /// Handle DELETE /api/v1/workouts/:id
    async fn handle_delete_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let workout = Self::load_workout(&resources, parse_id(&id, "workout")?).await?;
        require_write(&resources, &auth, workout.user_id).await?;
        resources.database.workouts().delete_workout(workout.id).await?;
        Ok(no_content())
    }

    /// Handle GET /api/v1/workouts/:id/canonical - nested days, sets and settings
    async fn handle_canonical(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let workout = Self::load_workout(&resources, parse_id(&id, "workout")?).await?;
        require_read(&resources, &auth, workout.user_id).await?;

        let unit = resources
            .database
            .users()
            .get_profile(workout.user_id)
            .await?
            .weight_unit;
        let components = resources
            .database
            .workouts()
            .load_components(workout.id, &resources.database.exercises())
            .await?;

        let canonical = build_canonical(workout, components, unit);
        Ok((StatusCode::OK, Json(canonical)).into_response())
    }

    /// Handle POST /api/v1/workouts/:id/copy - copy a readable workout to the caller
    async fn handle_copy_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        body: Option<Json<CopyWorkoutRequest>>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let workout = Self::load_workout(&resources, parse_id(&id, "workout")?).await?;
        require_read(&resources, &auth, workout.user_id).await?;

        let name = body.and_then(|Json(b)| b.name);
        if let Some(name) = &name {
            validate_name("name", name)?;
        }
        let copy = resources
            .database
            .workouts()
            .copy_workout(workout.id, auth.user_id, name.as_deref().map(str::trim))
            .await?;

        tracing::info!(source = %workout.id, copy = %copy.id, "Copied workout");
        Ok((StatusCode::CREATED, Json(copy)).into_response())
    }

    // ========================================================================
    // Days
    // ========================================================================

    async fn handle_list_days(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let workout = Self::load_workout(&resources, parse_id(&id, "workout")?).await?;
        require_read(&resources, &auth, workout.user_id).await?;
        let days = resources.database.workouts().list_days(workout.id).await?;
        Ok((StatusCode::OK, Json(days)).into_response())
    }

    async fn handle_create_day(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<DayRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let workout = Self::load_workout(&resources, parse_id(&id, "workout")?).await?;
        require_write(&resources, &auth, workout.user_id).await?;
        validate_name("description", &body.description)?;
        validate_days_of_week(&body.days_of_week)?;

        let mut days_of_week = body.days_of_week;
        days_of_week.sort_unstable();
        days_of_week.dedup();
        let day = Day {
            id: Uuid::new_v4(),
            workout_id: workout.id,
            description: body.description.trim().to_owned(),
            days_of_week,
        };
        resources.database.workouts().create_day(&day).await?;
        Ok((StatusCode::CREATED, Json(day)).into_response())
    }

    async fn handle_update_day(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<DayRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut day = Self::writable_day(&resources, &auth, parse_id(&id, "day")?).await?;
        validate_name("description", &body.description)?;
        validate_days_of_week(&body.days_of_week)?;

        day.description = body.description.trim().to_owned();
        day.days_of_week = body.days_of_week;
        day.days_of_week.sort_unstable();
        day.days_of_week.dedup();
        resources.database.workouts().update_day(&day).await?;
        Ok((StatusCode::OK, Json(day)).into_response())
    }

    async fn handle_delete_day(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let day = Self::writable_day(&resources, &auth, parse_id(&id, "day")?).await?;
        resources.database.workouts().delete_day(day.id).await?;
        Ok(no_content())
    }

    // ========================================================================
    // Sets
    // ========================================================================

    async fn handle_create_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<SetRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let day = Self::writable_day(&resources, &auth, parse_id(&id, "day")?).await?;
        let sets = Self::validate_set(&resources, &body).await?;

        let workouts = resources.database.workouts();
        let order = match body.order {
            Some(order) => order,
            None => workouts.next_set_order(day.id).await?,
        };
        let set = ExerciseSet {
            id: Uuid::new_v4(),
            day_id: day.id,
            order,
            sets,
            exercises: body.exercises,
        };
        workouts.create_set(&set).await?;
        Ok((StatusCode::CREATED, Json(set)).into_response())
    }

    /// Handle PUT /api/v1/sets/:id
    ///
    /// Settings for exercises no longer in the set are removed.
    async fn handle_update_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<SetRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let (mut set, _day) = Self::writable_set(&resources, &auth, parse_id(&id, "set")?).await?;
        set.sets = Self::validate_set(&resources, &body).await?;
        if let Some(order) = body.order {
            set.order = order;
        }
        set.exercises = body.exercises;

        let workouts = resources.database.workouts();
        workouts.update_set(&set).await?;
        let pruned = workouts.prune_settings(&set).await?;
        if pruned > 0 {
            tracing::debug!(set_id = %set.id, pruned, "Removed settings of dropped exercises");
        }
        Ok((StatusCode::OK, Json(set)).into_response())
    }

    async fn handle_delete_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let (set, _day) = Self::writable_set(&resources, &auth, parse_id(&id, "set")?).await?;
        resources.database.workouts().delete_set(set.id).await?;
        Ok(no_content())
    }

    // ========================================================================
    // Settings
    // ========================================================================

    async fn handle_create_setting(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<SettingRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let (set, day) = Self::writable_set(&resources, &auth, parse_id(&id, "set")?).await?;
        Self::validate_setting(&set, &body)?;

        let workouts = resources.database.workouts();
        let order = match body.order {
            Some(order) => order,
            None => {
                let existing = workouts
                    .list_settings(day.workout_id)
                    .await?
                    .iter()
                    .filter(|s| s.set_id == set.id && s.exercise_id == body.exercise_id)
                    .count();
                u32::try_from(existing).unwrap_or(u32::MAX).saturating_add(1)
            }
        };
        let setting = Setting {
            id: Uuid::new_v4(),
            set_id: set.id,
            exercise_id: body.exercise_id,
            reps: body.reps,
            weight: body.weight,
            rir: body.rir,
            order,
            comment: body.comment,
        };
        workouts.create_setting(&setting).await?;
        Ok((StatusCode::CREATED, Json(setting)).into_response())
    }

    async fn handle_update_setting(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<SettingRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let setting_id = parse_id(&id, "setting")?;
        let workouts = resources.database.workouts();
        let mut setting = workouts
            .get_setting(setting_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Setting {id}")))?;
        let (set, _day) = Self::writable_set(&resources, &auth, setting.set_id).await?;
        if body.exercise_id != setting.exercise_id {
            return Err(AppError::invalid_field(
                "exercise_id",
                "The exercise of a setting cannot be changed",
            ));
        }
        Self::validate_setting(&set, &body)?;

        setting.reps = body.reps;
        setting.weight = body.weight;
        setting.rir = body.rir;
        if let Some(order) = body.order {
            setting.order = order;
        }
        setting.comment = body.comment;
        workouts.update_setting(&setting).await?;
        Ok((StatusCode::OK, Json(setting)).into_response())
    }

    async fn handle_delete_setting(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let setting_id = parse_id(&id, "setting")?;
        let workouts = resources.database.workouts();
        let setting = workouts
            .get_setting(setting_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Setting {id}")))?;
        Self::writable_set(&resources, &auth, setting.set_id).await?;
        workouts.delete_setting(setting.id).await?;
        Ok(no_content())
    }
}
