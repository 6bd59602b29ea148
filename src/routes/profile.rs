// ABOUTME: Profile routes for user settings and derived body statistics
// ABOUTME: Partial profile updates are validated before saving
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{authenticate, OwnerQuery};
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use workout_core::body_stats::{self, BodyStatistics};
use workout_core::models::{Gender, Intensity, MassUnit, User, UserProfile};

/// Account together with its profile
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Account
    pub user: User,
    /// Settings
    pub profile: UserProfile,
}

/// Editable profile fields, absent fields keep their value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    /// Contact address, an empty string clears it
    pub email: Option<String>,
    /// Show exercise comments
    pub show_comments: Option<bool>,
    /// Send workout reminders
    pub workout_reminder_active: Option<bool>,
    /// Days before a workout ends when the reminder is sent
    pub workout_reminder: Option<u32>,
    /// Default workout lifetime in weeks
    pub workout_duration: Option<u32>,
    /// Age in years
    pub age: Option<u32>,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Gender
    pub gender: Option<Gender>,
    /// Sleep hours per day
    pub sleep_hours: Option<f64>,
    /// Work hours per day
    pub work_hours: Option<f64>,
    /// Work intensity
    pub work_intensity: Option<Intensity>,
    /// Sport hours per week
    pub sport_hours: Option<f64>,
    /// Sport intensity
    pub sport_intensity: Option<Intensity>,
    /// Free time hours per day
    pub freetime_hours: Option<f64>,
    /// Free time intensity
    pub freetime_intensity: Option<Intensity>,
    /// Daily calorie target
    pub calories: Option<f64>,
    /// Preferred mass unit
    pub weight_unit: Option<MassUnit>,
    /// Share data read-only with other users
    pub ro_access: Option<bool>,
    /// Days without a weight entry before a reminder, 0 disables
    pub num_days_weight_reminder: Option<u32>,
}

impl UpdateProfileRequest {
    fn apply(self, profile: &mut UserProfile) {
        macro_rules! assign {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    profile.$field = value;
                })*
            };
        }
        assign!(
            show_comments,
            workout_reminder_active,
            workout_reminder,
            workout_duration,
            sleep_hours,
            work_hours,
            work_intensity,
            sport_hours,
            sport_intensity,
            freetime_hours,
            freetime_intensity,
            calories,
            weight_unit,
            ro_access,
            num_days_weight_reminder,
        );
        if self.age.is_some() {
            profile.age = self.age;
        }
        if self.height.is_some() {
            profile.height = self.height;
        }
        if self.gender.is_some() {
            profile.gender = self.gender;
        }
    }
}

/// Profile routes
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// Create the profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/v1/profile",
                get(Self::handle_get_profile).put(Self::handle_update_profile),
            )
            .route("/api/v1/profile/calculations", get(Self::handle_calculations))
            .with_state(resources)
    }

    /// Handle GET /api/v1/profile
    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = query.readable_owner(&resources, &auth).await?;

        let users = resources.database.users();
        let user = users
            .get_user(owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        let profile = users.get_profile(owner_id).await?;

        Ok((StatusCode::OK, Json(ProfileResponse { user, profile })).into_response())
    }

    /// Handle PUT /api/v1/profile
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<UpdateProfileRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let users = resources.database.users();

        if let Some(email) = &body.email {
            let email = Some(email.trim()).filter(|e| !e.is_empty());
            if email.is_some_and(|e| !e.contains('@')) {
                return Err(AppError::invalid_field("email", "Enter a valid email address"));
            }
            users.update_email(auth.user_id, email).await?;
        }

        let mut profile = users.get_profile(auth.user_id).await?;
        body.apply(&mut profile);
        body_stats::validate_profile(&profile)?;
        users.update_profile(&profile).await?;

        let user = users
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        Ok((StatusCode::OK, Json(ProfileResponse { user, profile })).into_response())
    }

    /// Handle GET /api/v1/profile/calculations - BMI, BMR and daily calories
    async fn handle_calculations(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = query.readable_owner(&resources, &auth).await?;

        let profile = resources.database.users().get_profile(owner_id).await?;
        let latest = resources.database.weight().latest_entry(owner_id).await?;
        let stats: BodyStatistics = body_stats::calculate(&profile, latest.map(|e| e.weight));

        Ok((StatusCode::OK, Json(stats)).into_response())
    }
}
