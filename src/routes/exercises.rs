// ABOUTME: Exercise catalog routes with languages, categories, muscles and equipment
// ABOUTME: User submissions enter moderation as pending until a manager accepts them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Exercise catalog routes
//!
//! Reading accepted catalog entries needs no token. Submitting exercises
//! needs an account, and everything that changes shared catalog data needs
//! the `MANAGE_EXERCISES` permission.

use super::{authenticate, no_content, parse_id, validate_name};
use crate::auth::AuthResult;
use crate::database::ExerciseFilter;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use workout_core::models::{Exercise, ModerationStatus};
use workout_core::permissions::Permissions;

/// New language
#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    /// Short code such as `de`
    pub short_name: String,
    /// Display name
    pub full_name: String,
}

/// Named catalog entry such as a category or equipment
#[derive(Debug, Deserialize)]
pub struct NamedRequest {
    /// Display name
    pub name: String,
}

/// New muscle
#[derive(Debug, Deserialize)]
pub struct MuscleRequest {
    /// Display name
    pub name: String,
    /// Shown on the front of the body diagram
    #[serde(default)]
    pub is_front: bool,
}

/// Exercise listing filters
#[derive(Debug, Default, Deserialize)]
pub struct ExerciseQuery {
    /// `pending`, `accepted` or `declined`, defaults to `accepted`
    pub status: Option<ModerationStatus>,
    /// Category ID
    pub category: Option<String>,
    /// Language short name
    pub language: Option<String>,
    /// Name fragment
    pub search: Option<String>,
}

/// Exercise submission or edit
#[derive(Debug, Deserialize)]
pub struct ExerciseRequest {
    /// Name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Category ID
    pub category_id: Uuid,
    /// Language short name, defaults to the default language
    pub language: Option<String>,
    /// Primary muscles
    #[serde(default)]
    pub muscles: Vec<Uuid>,
    /// Secondary muscles
    #[serde(default)]
    pub muscles_secondary: Vec<Uuid>,
    /// Equipment
    #[serde(default)]
    pub equipment: Vec<Uuid>,
    /// Author credited by the license
    pub license_author: Option<String>,
}

/// New comment
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    /// Text
    pub comment: String,
}

/// Exercise catalog routes
pub struct ExerciseRoutes;

impl ExerciseRoutes {
    /// Create the catalog routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/v1/languages",
                get(Self::handle_list_languages).post(Self::handle_create_language),
            )
            .route(
                "/api/v1/exercise-categories",
                get(Self::handle_list_categories).post(Self::handle_create_category),
            )
            .route(
                "/api/v1/muscles",
                get(Self::handle_list_muscles).post(Self::handle_create_muscle),
            )
            .route(
                "/api/v1/equipment",
                get(Self::handle_list_equipment).post(Self::handle_create_equipment),
            )
            .route(
                "/api/v1/exercises",
                get(Self::handle_list_exercises).post(Self::handle_submit_exercise),
            )
            .route(
                "/api/v1/exercises/:id",
                get(Self::handle_get_exercise)
                    .put(Self::handle_update_exercise)
                    .delete(Self::handle_delete_exercise),
            )
            .route("/api/v1/exercises/:id/accept", post(Self::handle_accept))
            .route("/api/v1/exercises/:id/decline", post(Self::handle_decline))
            .route(
                "/api/v1/exercises/:id/comments",
                get(Self::handle_list_comments).post(Self::handle_create_comment),
            )
            .route(
                "/api/v1/exercises/:id/comments/:comment_id",
                delete(Self::handle_delete_comment),
            )
            .with_state(resources)
    }

    async fn authenticate_manager(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> AppResult<AuthResult> {
        let auth = authenticate(headers, resources).await?;
        auth.principal().require(Permissions::MANAGE_EXERCISES)?;
        Ok(auth)
    }

    // ========================================================================
    // Reference data
    // ========================================================================

    async fn handle_list_languages(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let languages = resources.database.exercises().list_languages().await?;
        Ok((StatusCode::OK, Json(languages)).into_response())
    }

    async fn handle_create_language(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<LanguageRequest>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        validate_name("short_name", &body.short_name)?;
        validate_name("full_name", &body.full_name)?;

        let language = resources
            .database
            .exercises()
            .create_language(body.short_name.trim(), body.full_name.trim())
            .await?;
        Ok((StatusCode::CREATED, Json(language)).into_response())
    }

    async fn handle_list_categories(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let categories = resources.database.exercises().list_categories().await?;
        Ok((StatusCode::OK, Json(categories)).into_response())
    }

    async fn handle_create_category(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<NamedRequest>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        validate_name("name", &body.name)?;
        let category = resources
            .database
            .exercises()
            .create_category(body.name.trim())
            .await?;
        Ok((StatusCode::CREATED, Json(category)).into_response())
    }

    async fn handle_list_muscles(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let muscles = resources.database.exercises().list_muscles().await?;
        Ok((StatusCode::OK, Json(muscles)).into_response())
    }

    async fn handle_create_muscle(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<MuscleRequest>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        validate_name("name", &body.name)?;
        let muscle = resources
            .database
            .exercises()
            .create_muscle(body.name.trim(), body.is_front)
            .await?;
        Ok((StatusCode::CREATED, Json(muscle)).into_response())
    }

    async fn handle_list_equipment(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let equipment = resources.database.exercises().list_equipment().await?;
        Ok((StatusCode::OK, Json(equipment)).into_response())
    }

    async fn handle_create_equipment(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<NamedRequest>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        validate_name("name", &body.name)?;
        let equipment = resources
            .database
            .exercises()
            .create_equipment(body.name.trim())
            .await?;
        Ok((StatusCode::CREATED, Json(equipment)).into_response())
    }

    // ========================================================================
    // Exercises
    // ========================================================================

    /// Handle GET /api/v1/exercises
    ///
    /// Only accepted exercises are public; other review states need a manager.
    async fn handle_list_exercises(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ExerciseQuery>,
    ) -> Result<Response, AppError> {
        let status = query.status.unwrap_or(ModerationStatus::Accepted);
        if status != ModerationStatus::Accepted {
            Self::authenticate_manager(&headers, &resources).await?;
        }

        let exercises = resources.database.exercises();
        let language_id = match query.language.as_deref() {
            Some(short_name) => Some(
                exercises
                    .get_language_by_short_name(short_name)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Language {short_name}")))?
                    .id,
            ),
            None => None,
        };
        let filter = ExerciseFilter {
            status: Some(status),
            category_id: query
                .category
                .as_deref()
                .map(|id| parse_id(id, "category"))
                .transpose()?,
            language_id,
            search: query.search.filter(|s| !s.trim().is_empty()),
        };

        let list = exercises.list_exercises(&filter).await?;
        Ok((StatusCode::OK, Json(list)).into_response())
    }

    /// Handle GET /api/v1/exercises/:id
    async fn handle_get_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let exercise_id = parse_id(&id, "exercise")?;
        let exercise = resources
            .database
            .exercises()
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Exercise {id}")))?;

        if exercise.status != ModerationStatus::Accepted {
            let auth = authenticate(&headers, &resources).await?;
            if exercise.author_id != Some(auth.user_id) {
                auth.principal().require(Permissions::MANAGE_EXERCISES)?;
            }
        }

        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    async fn validate_references(
        resources: &ServerResources,
        body: &ExerciseRequest,
    ) -> AppResult<Uuid> {
        validate_name("name", &body.name)?;
        let exercises = resources.database.exercises();

        let categories = exercises.list_categories().await?;
        if !categories.iter().any(|c| c.id == body.category_id) {
            return Err(AppError::invalid_field("category_id", "Unknown exercise category"));
        }

        let muscles = exercises.muscles_by_id().await?;
        if let Some(unknown) = body
            .muscles
            .iter()
            .chain(&body.muscles_secondary)
            .find(|id| !muscles.contains_key(*id))
        {
            return Err(AppError::invalid_field("muscles", format!("Unknown muscle {unknown}")));
        }

        let equipment: HashSet<Uuid> = exercises
            .list_equipment()
            .await?
            .into_iter()
            .map(|e| e.id)
            .collect();
        if let Some(unknown) = body.equipment.iter().find(|id| !equipment.contains(*id)) {
            return Err(AppError::invalid_field(
                "equipment",
                format!("Unknown equipment {unknown}"),
            ));
        }

        let language = match body.language.as_deref() {
            Some(short_name) => exercises
                .get_language_by_short_name(short_name)
                .await?
                .ok_or_else(|| AppError::invalid_field("language", "Unknown language"))?,
            None => exercises.default_language().await?,
        };
        Ok(language.id)
    }

    /// Handle POST /api/v1/exercises - submit an exercise for review
    async fn handle_submit_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<ExerciseRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let language_id = Self::validate_references(&resources, &body).await?;

        let status = if auth.principal().has(Permissions::MANAGE_EXERCISES) {
            ModerationStatus::Accepted
        } else {
            ModerationStatus::Pending
        };
        let exercise = Exercise {
            id: Uuid::new_v4(),
            name: body.name.trim().to_owned(),
            description: body.description,
            category_id: body.category_id,
            language_id,
            muscles: body.muscles,
            muscles_secondary: body.muscles_secondary,
            equipment: body.equipment,
            status,
            license_author: body.license_author.or_else(|| Some(auth.username.clone())),
            author_id: Some(auth.user_id),
            created_at: Utc::now(),
        };
        resources.database.exercises().create_exercise(&exercise).await?;

        info!(exercise_id = %exercise.id, status = status.as_str(), "Exercise submitted");
        Ok((StatusCode::CREATED, Json(exercise)).into_response())
    }

    /// Handle PUT /api/v1/exercises/:id
    async fn handle_update_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<ExerciseRequest>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        let exercise_id = parse_id(&id, "exercise")?;
        let exercises = resources.database.exercises();
        let mut exercise = exercises
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Exercise {id}")))?;

        exercise.language_id = Self::validate_references(&resources, &body).await?;
        exercise.name = body.name.trim().to_owned();
        exercise.description = body.description;
        exercise.category_id = body.category_id;
        exercise.muscles = body.muscles;
        exercise.muscles_secondary = body.muscles_secondary;
        exercise.equipment = body.equipment;
        if body.license_author.is_some() {
            exercise.license_author = body.license_author;
        }
        exercises.update_exercise(&exercise).await?;

        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    /// Handle DELETE /api/v1/exercises/:id
    async fn handle_delete_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        let exercise_id = parse_id(&id, "exercise")?;
        resources.database.exercises().delete_exercise(exercise_id).await?;
        Ok(no_content())
    }

    async fn moderate(
        resources: &ServerResources,
        id: &str,
        status: ModerationStatus,
    ) -> Result<Response, AppError> {
        let exercise_id = parse_id(id, "exercise")?;
        let exercises = resources.database.exercises();
        exercises.set_status(exercise_id, status).await?;
        let exercise = exercises
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Exercise {id}")))?;

        info!(exercise_id = %exercise_id, status = status.as_str(), "Exercise reviewed");
        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    /// Handle POST /api/v1/exercises/:id/accept
    async fn handle_accept(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        Self::moderate(&resources, &id, ModerationStatus::Accepted).await
    }

    /// Handle POST /api/v1/exercises/:id/decline
    async fn handle_decline(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        Self::moderate(&resources, &id, ModerationStatus::Declined).await
    }

    // ========================================================================
    // Comments
    // ========================================================================

    async fn handle_list_comments(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let exercise_id = parse_id(&id, "exercise")?;
        let comments = resources.database.exercises().list_comments(exercise_id).await?;
        Ok((StatusCode::OK, Json(comments)).into_response())
    }

    async fn handle_create_comment(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<CommentRequest>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        let exercise_id = parse_id(&id, "exercise")?;
        if body.comment.trim().is_empty() {
            return Err(AppError::invalid_field("comment", "This field may not be blank"));
        }

        let exercises = resources.database.exercises();
        exercises
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Exercise {id}")))?;
        let comment = exercises
            .create_comment(exercise_id, body.comment.trim())
            .await?;
        Ok((StatusCode::CREATED, Json(comment)).into_response())
    }

    async fn handle_delete_comment(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, comment_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        Self::authenticate_manager(&headers, &resources).await?;
        let exercise_id = parse_id(&id, "exercise")?;
        let comment_id = parse_id(&comment_id, "comment")?;
        resources
            .database
            .exercises()
            .delete_comment(exercise_id, comment_id)
            .await?;
        Ok(no_content())
    }
}
