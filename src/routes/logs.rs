// ABOUTME: Training log routes for logged exercises, workout sessions and the monthly calendar
// ABOUTME: Logged entries must reference a workout of the same user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{authenticate, no_content, parse_id, require_read, require_write, today, OwnerQuery};
use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use workout_core::constants::limits;
use workout_core::models::{Impression, Workout, WorkoutLog, WorkoutSession};
use workout_core::routine::validate_session_times;

/// Log listing filters
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    /// Whose logs, defaults to the caller
    pub user_id: Option<String>,
    /// Only logs of this workout
    pub workout: Option<String>,
    /// Only logs of this exercise
    pub exercise: Option<String>,
}

/// Logged exercise fields
#[derive(Debug, Deserialize)]
pub struct LogRequest {
    /// Workout the exercise was done for
    pub workout_id: Uuid,
    /// Exercise
    pub exercise_id: Uuid,
    /// Repetitions done
    pub reps: u32,
    /// Weight used
    pub weight: f64,
    /// Reps in reserve
    pub rir: Option<f64>,
    /// Training date, defaults to today
    pub date: Option<NaiveDate>,
}

/// Session fields
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// Workout trained
    pub workout_id: Uuid,
    /// Training date, defaults to today
    pub date: Option<NaiveDate>,
    /// Notes
    #[serde(default)]
    pub notes: String,
    /// General impression
    #[serde(default)]
    pub impression: Impression,
    /// Start time
    pub time_start: Option<NaiveTime>,
    /// End time
    pub time_end: Option<NaiveTime>,
}

/// Workout log routes
pub struct WorkoutLogRoutes;

impl WorkoutLogRoutes {
    /// Create the log, session and calendar routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/v1/logs",
                get(Self::handle_list_logs).post(Self::handle_create_log),
            )
            .route(
                "/api/v1/logs/:id",
                get(Self::handle_get_log)
                    .put(Self::handle_update_log)
                    .delete(Self::handle_delete_log),
            )
            .route(
                "/api/v1/sessions",
                get(Self::handle_list_sessions).post(Self::handle_create_session),
            )
            .route(
                "/api/v1/sessions/:id",
                get(Self::handle_get_session)
                    .put(Self::handle_update_session)
                    .delete(Self::handle_delete_session),
            )
            .route("/api/v1/calendar/:year/:month", get(Self::handle_calendar))
            .with_state(resources)
    }

    /// Workout the caller may log against
    async fn writable_workout(
        resources: &ServerResources,
        auth: &AuthResult,
        workout_id: Uuid,
    ) -> AppResult<Workout> {
        let workout = resources
            .database
            .workouts()
            .get_workout(workout_id)
            .await?
            .ok_or_else(|| AppError::invalid_field("workout_id", "Unknown workout"))?;
        if workout.user_id != auth.user_id {
            return Err(AppError::permission_denied(
                "Entries can only be logged for your own workouts",
            ));
        }
        Ok(workout)
    }

    async fn validate_log(resources: &ServerResources, body: &LogRequest) -> AppResult<()> {
        if body.reps > limits::MAX_REPS {
            return Err(AppError::out_of_range("reps", 0.0, f64::from(limits::MAX_REPS)));
        }
        if body.weight < 0.0 {
            return Err(AppError::invalid_field("weight", "Weight may not be negative"));
        }
        if body.rir.is_some_and(|r| !(0.0..=limits::MAX_RIR).contains(&r)) {
            return Err(AppError::out_of_range("rir", 0.0, limits::MAX_RIR));
        }
        resources
            .database
            .exercises()
            .get_exercise(body.exercise_id)
            .await?
            .ok_or_else(|| AppError::invalid_field("exercise_id", "Unknown exercise"))?;
        Ok(())
    }

    // ========================================================================
    // Logs
    // ========================================================================

    async fn handle_list_logs(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<LogQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = OwnerQuery {
            user_id: query.user_id,
        }
        .readable_owner(&resources, &auth)
        .await?;
        let workout_id = query
            .workout
            .as_deref()
            .map(|id| parse_id(id, "workout"))
            .transpose()?;
        let exercise_id = query
            .exercise
            .as_deref()
            .map(|id| parse_id(id, "exercise"))
            .transpose()?;

        let logs = resources
            .database
            .logs()
            .list_logs(owner_id, workout_id, exercise_id)
            .await?;
        Ok((StatusCode::OK, Json(logs)).into_response())
    }

    async fn handle_create_log(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<LogRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        Self::writable_workout(&resources, &auth, body.workout_id).await?;
        Self::validate_log(&resources, &body).await?;

        let log = WorkoutLog {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            workout_id: body.workout_id,
            exercise_id: body.exercise_id,
            reps: body.reps,
            weight: body.weight,
            rir: body.rir,
            date: body.date.unwrap_or_else(today),
        };
        resources.database.logs().create_log(&log).await?;
        Ok((StatusCode::CREATED, Json(log)).into_response())
    }

    async fn load_log(resources: &ServerResources, id: &str) -> AppResult<WorkoutLog> {
        resources
            .database
            .logs()
            .get_log(parse_id(id, "log")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Workout log {id}")))
    }

    async fn handle_get_log(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let log = Self::load_log(&resources, &id).await?;
        require_read(&resources, &auth, log.user_id).await?;
        Ok((StatusCode::OK, Json(log)).into_response())
    }

    async fn handle_update_log(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<LogRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut log = Self::load_log(&resources, &id).await?;
        require_write(&resources, &auth, log.user_id).await?;
        if body.workout_id != log.workout_id || body.exercise_id != log.exercise_id {
            return Err(AppError::invalid_input(
                "The workout and exercise of a log entry cannot be changed",
            ));
        }
        Self::validate_log(&resources, &body).await?;

        log.reps = body.reps;
        log.weight = body.weight;
        log.rir = body.rir;
        if let Some(date) = body.date {
            log.date = date;
        }
        resources.database.logs().update_log(&log).await?;
        Ok((StatusCode::OK, Json(log)).into_response())
    }

    async fn handle_delete_log(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let log = Self::load_log(&resources, &id).await?;
        require_write(&resources, &auth, log.user_id).await?;
        resources.database.logs().delete_log(log.id).await?;
        Ok(no_content())
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    async fn handle_list_sessions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = query.readable_owner(&resources, &auth).await?;
        let sessions = resources.database.logs().list_sessions(owner_id).await?;
        Ok((StatusCode::OK, Json(sessions)).into_response())
    }

    async fn handle_create_session(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<SessionRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        Self::writable_workout(&resources, &auth, body.workout_id).await?;
        validate_session_times(body.time_start, body.time_end)?;

        let session = WorkoutSession {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            workout_id: body.workout_id,
            date: body.date.unwrap_or_else(today),
            notes: body.notes,
            impression: body.impression,
            time_start: body.time_start,
            time_end: body.time_end,
        };
        resources.database.logs().create_session(&session).await?;
        Ok((StatusCode::CREATED, Json(session)).into_response())
    }

    async fn load_session(resources: &ServerResources, id: &str) -> AppResult<WorkoutSession> {
        resources
            .database
            .logs()
            .get_session(parse_id(id, "session")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session {id}")))
    }

    async fn handle_get_session(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let session = Self::load_session(&resources, &id).await?;
        require_read(&resources, &auth, session.user_id).await?;
        Ok((StatusCode::OK, Json(session)).into_response())
    }

    async fn handle_update_session(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<SessionRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut session = Self::load_session(&resources, &id).await?;
        require_write(&resources, &auth, session.user_id).await?;
        Self::writable_workout(&resources, &auth, body.workout_id).await?;
        validate_session_times(body.time_start, body.time_end)?;

        session.workout_id = body.workout_id;
        if let Some(date) = body.date {
            session.date = date;
        }
        session.notes = body.notes;
        session.impression = body.impression;
        session.time_start = body.time_start;
        session.time_end = body.time_end;
        resources.database.logs().update_session(&session).await?;
        Ok((StatusCode::OK, Json(session)).into_response())
    }

    async fn handle_delete_session(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let session = Self::load_session(&resources, &id).await?;
        require_write(&resources, &auth, session.user_id).await?;
        resources.database.logs().delete_session(session.id).await?;
        Ok(no_content())
    }

    // ========================================================================
    // Calendar
    // ========================================================================

    /// Handle GET /api/v1/calendar/:year/:month
    async fn handle_calendar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((year, month)): Path<(i32, u32)>,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = query.readable_owner(&resources, &auth).await?;
        let days = resources.database.logs().calendar(owner_id, year, month).await?;
        Ok((StatusCode::OK, Json(days)).into_response())
    }
}
