// ABOUTME: Schedule routes for rotating workouts over consecutive weeks
// ABOUTME: Serves step date windows and resolves the workout to train today
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{
    authenticate, no_content, parse_id, require_read, require_write, today, validate_name,
    OwnerQuery,
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
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use workout_core::constants::limits;
use workout_core::models::{Schedule, ScheduleStep};
use workout_core::scheduling::{self, CurrentWorkout, StepWindow};

/// Schedule fields
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    /// Name
    pub name: String,
    /// First day of the first step
    pub start_date: NaiveDate,
    /// Whether this is the user's active schedule
    #[serde(default)]
    pub is_active: bool,
    /// Start over after the last step
    #[serde(default)]
    pub is_loop: bool,
}

/// Schedule step fields
#[derive(Debug, Deserialize)]
pub struct StepRequest {
    /// Workout of the step, owned by the schedule owner
    pub workout_id: Uuid,
    /// Duration in weeks
    pub duration: u32,
    /// Position, appended when absent
    pub order: Option<u32>,
}

/// Schedule with steps and computed dates
#[derive(Debug, Serialize)]
pub struct ScheduleDetail {
    /// Schedule
    #[serde(flatten)]
    pub schedule: Schedule,
    /// Steps in order
    pub steps: Vec<ScheduleStep>,
    /// Date window of every step
    pub windows: Vec<StepWindow>,
    /// Day after the last step, absent for loops
    pub end_date: Option<NaiveDate>,
    /// Step active today
    pub current_step_id: Option<Uuid>,
}

/// Schedule routes
pub struct ScheduleRoutes;

impl ScheduleRoutes {
    /// Create the schedule routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/v1/schedules",
                get(Self::handle_list_schedules).post(Self::handle_create_schedule),
            )
            .route(
                "/api/v1/schedules/:id",
                get(Self::handle_get_schedule)
                    .put(Self::handle_update_schedule)
                    .delete(Self::handle_delete_schedule),
            )
            .route("/api/v1/schedules/:id/steps", post(Self::handle_create_step))
            .route(
                "/api/v1/steps/:id",
                put(Self::handle_update_step).delete(Self::handle_delete_step),
            )
            .route("/api/v1/current-workout", get(Self::handle_current_workout))
            .with_state(resources)
    }

    async fn load_schedule(resources: &ServerResources, id: Uuid) -> AppResult<Schedule> {
        resources
            .database
            .schedules()
            .get_schedule(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Schedule {id}")))
    }

    async fn detail(resources: &ServerResources, schedule: Schedule) -> AppResult<ScheduleDetail> {
        let steps = resources.database.schedules().list_steps(schedule.id).await?;
        let current_step_id = scheduling::current_step(&schedule, &steps, today()).map(|s| s.id);
        Ok(ScheduleDetail {
            windows: scheduling::step_windows(&schedule, &steps),
            end_date: scheduling::end_date(&schedule, &steps),
            current_step_id,
            steps,
            schedule,
        })
    }

    async fn validate_step(
        resources: &ServerResources,
        schedule: &Schedule,
        body: &StepRequest,
    ) -> AppResult<()> {
        if !(limits::MIN_STEP_WEEKS..=limits::MAX_STEP_WEEKS).contains(&body.duration) {
            return Err(AppError::out_of_range(
                "duration",
                f64::from(limits::MIN_STEP_WEEKS),
                f64::from(limits::MAX_STEP_WEEKS),
            ));
        }
        let workout = resources
            .database
            .workouts()
            .get_workout(body.workout_id)
            .await?
            .ok_or_else(|| AppError::invalid_field("workout_id", "Unknown workout"))?;
        if workout.user_id != schedule.user_id {
            return Err(AppError::invalid_field(
                "workout_id",
                "The workout must belong to the schedule owner",
            ));
        }
        Ok(())
    }

    async fn writable_step(
        resources: &ServerResources,
        auth: &AuthResult,
        id: &str,
    ) -> AppResult<(ScheduleStep, Schedule)> {
        let step = resources
            .database
            .schedules()
            .get_step(parse_id(id, "step")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Schedule step {id}")))?;
        let schedule = Self::load_schedule(resources, step.schedule_id).await?;
        require_write(resources, auth, schedule.user_id).await?;
        Ok((step, schedule))
    }

    // ========================================================================
    // Schedules
    // ========================================================================

    async fn handle_list_schedules(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = query.readable_owner(&resources, &auth).await?;
        let schedules = resources.database.schedules().list_schedules(owner_id).await?;
        Ok((StatusCode::OK, Json(schedules)).into_response())
    }

    /// Handle POST /api/v1/schedules
    ///
    /// Creating an active schedule deactivates the user's other schedules.
    async fn handle_create_schedule(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<ScheduleRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        validate_name("name", &body.name)?;

        let schedule = Schedule {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            name: body.name.trim().to_owned(),
            start_date: body.start_date,
            is_active: body.is_active,
            is_loop: body.is_loop,
        };
        resources.database.schedules().create_schedule(&schedule).await?;
        let detail = Self::detail(&resources, schedule).await?;
        Ok((StatusCode::CREATED, Json(detail)).into_response())
    }

    async fn handle_get_schedule(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let schedule = Self::load_schedule(&resources, parse_id(&id, "schedule")?).await?;
        require_read(&resources, &auth, schedule.user_id).await?;
        let detail = Self::detail(&resources, schedule).await?;
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    async fn handle_update_schedule(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<ScheduleRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut schedule = Self::load_schedule(&resources, parse_id(&id, "schedule")?).await?;
        require_write(&resources, &auth, schedule.user_id).await?;
        validate_name("name", &body.name)?;

        schedule.name = body.name.trim().to_owned();
        schedule.start_date = body.start_date;
        schedule.is_active = body.is_active;
        schedule.is_loop = body.is_loop;
        resources.database.schedules().update_schedule(&schedule).await?;
        let detail = Self::detail(&resources, schedule).await?;
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    async fn handle_delete_schedule(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let schedule = Self::load_schedule(&resources, parse_id(&id, "schedule")?).await?;
        require_write(&resources, &auth, schedule.user_id).await?;
        resources.database.schedules().delete_schedule(schedule.id).await?;
        Ok(no_content())
    }

    // ========================================================================
    // Steps
    // ========================================================================

    async fn handle_create_step(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<StepRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let schedule = Self::load_schedule(&resources, parse_id(&id, "schedule")?).await?;
        require_write(&resources, &auth, schedule.user_id).await?;
        Self::validate_step(&resources, &schedule, &body).await?;

        let schedules = resources.database.schedules();
        let order = match body.order {
            Some(order) => order,
            None => schedules.next_step_order(schedule.id).await?,
        };
        let step = ScheduleStep {
            id: Uuid::new_v4(),
            schedule_id: schedule.id,
            workout_id: body.workout_id,
            duration: body.duration,
            order,
        };
        schedules.create_step(&step).await?;
        Ok((StatusCode::CREATED, Json(step)).into_response())
    }

    async fn handle_update_step(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<StepRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let (mut step, schedule) = Self::writable_step(&resources, &auth, &id).await?;
        Self::validate_step(&resources, &schedule, &body).await?;

        step.workout_id = body.workout_id;
        step.duration = body.duration;
        if let Some(order) = body.order {
            step.order = order;
        }
        resources.database.schedules().update_step(&step).await?;
        Ok((StatusCode::OK, Json(step)).into_response())
    }

    async fn handle_delete_step(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let (step, _schedule) = Self::writable_step(&resources, &auth, &id).await?;
        resources.database.schedules().delete_step(step.id).await?;
        Ok(no_content())
    }

    /// Handle GET /api/v1/current-workout
    ///
    /// Uses the active schedule when one of its steps covers today, otherwise
    /// the most recently created workout. Responds with `null` when the user
    /// has no workouts at all.
    async fn handle_current_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = query.readable_owner(&resources, &auth).await?;

        let active = resources.database.schedules().active_schedule(owner_id).await?;
        let workouts = resources.database.workouts().list_workouts(owner_id).await?;
        let current: Option<CurrentWorkout> = scheduling::resolve_current_workout(
            active.as_ref().map(|(schedule, steps)| (schedule, steps.as_slice())),
            &workouts,
            today(),
        );
        Ok((StatusCode::OK, Json(current)).into_response())
    }
}
