// ABOUTME: Social group routes for membership, applications and group administration
// ABOUTME: Public groups are joined directly, private groups through accepted applications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{authenticate, no_content, parse_id, validate_name};
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
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use workout_core::groups::{join_decision, require_admin, JoinOutcome, LeaveOutcome};
use workout_core::models::{Group, Membership};

/// Group fields
#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    /// Name, unique
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Whether anybody may join without approval
    #[serde(default)]
    pub public: bool,
    /// Gym the group belongs to
    pub gym_id: Option<Uuid>,
}

/// Group listing filters
#[derive(Debug, Default, Deserialize)]
pub struct GroupQuery {
    /// Only groups the caller belongs to
    #[serde(default)]
    pub mine: bool,
}

/// Result of a join request
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    /// `joined` or `applied`
    pub status: &'static str,
}

/// Group routes
pub struct GroupRoutes;

impl GroupRoutes {
    /// Create the group routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/groups", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/v1/groups/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/v1/groups/:id/join", post(Self::handle_join))
            .route("/api/v1/groups/:id/leave", post(Self::handle_leave))
            .route("/api/v1/groups/:id/members", get(Self::handle_list_members))
            .route(
                "/api/v1/groups/:id/members/:user_id",
                delete(Self::handle_remove_member),
            )
            .route(
                "/api/v1/groups/:id/members/:user_id/promote",
                post(Self::handle_promote),
            )
            .route(
                "/api/v1/groups/:id/members/:user_id/demote",
                post(Self::handle_demote),
            )
            .route("/api/v1/groups/:id/applications", get(Self::handle_list_applications))
            .route(
                "/api/v1/groups/:id/applications/:user_id/accept",
                post(Self::handle_accept_application),
            )
            .route(
                "/api/v1/groups/:id/applications/:user_id/decline",
                post(Self::handle_decline_application),
            )
            .with_state(resources)
    }

    async fn load_group(resources: &ServerResources, id: &str) -> AppResult<Group> {
        let group_id = parse_id(id, "group")?;
        resources
            .database
            .groups()
            .get_group(group_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group {group_id}")))
    }

    /// Group and its members, failing unless the caller administers it
    async fn administered_group(
        resources: &ServerResources,
        id: &str,
        user_id: Uuid,
    ) -> AppResult<(Group, Vec<Membership>)> {
        let group = Self::load_group(resources, id).await?;
        let members = resources.database.groups().list_members(group.id).await?;
        require_admin(&members, user_id)?;
        Ok((group, members))
    }

    // ========================================================================
    // Groups
    // ========================================================================

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<GroupQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let groups = resources.database.groups();
        let list = if query.mine {
            groups.list_user_groups(auth.user_id).await?
        } else {
            groups.list_groups().await?
        };
        Ok((StatusCode::OK, Json(list)).into_response())
    }

    /// Handle POST /api/v1/groups - the creator becomes the first administrator
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<GroupRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        validate_name("name", &body.name)?;
        if let Some(gym_id) = body.gym_id {
            resources
                .database
                .gyms()
                .get_gym(gym_id)
                .await?
                .ok_or_else(|| AppError::invalid_field("gym_id", "Unknown gym"))?;
        }

        let group = Group {
            id: Uuid::new_v4(),
            name: body.name.trim().to_owned(),
            description: body.description,
            public: body.public,
            creator_id: auth.user_id,
            gym_id: body.gym_id,
            created_at: Utc::now(),
        };
        resources.database.groups().create_group(&group).await?;
        tracing::info!(group_id = %group.id, creator = %auth.user_id, "Created group");
        Ok((StatusCode::CREATED, Json(group)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        let group = Self::load_group(&resources, &id).await?;
        Ok((StatusCode::OK, Json(group)).into_response())
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<GroupRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let (mut group, _) = Self::administered_group(&resources, &id, auth.user_id).await?;
        validate_name("name", &body.name)?;

        group.name = body.name.trim().to_owned();
        group.description = body.description;
        group.public = body.public;
        resources.database.groups().update_group(&group).await?;
        Ok((StatusCode::OK, Json(group)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let (group, _) = Self::administered_group(&resources, &id, auth.user_id).await?;
        resources.database.groups().delete_group(group.id).await?;
        Ok(no_content())
    }

    // ========================================================================
    // Joining and leaving
    // ========================================================================

    /// Handle POST /api/v1/groups/:id/join
    ///
    /// Answers 201 when the membership was created and 202 when an
    /// application now waits for an administrator.
    async fn handle_join(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let group = Self::load_group(&resources, &id).await?;
        let groups = resources.database.groups();

        let members = groups.list_members(group.id).await?;
        let is_member = members.iter().any(|m| m.user_id == auth.user_id);
        let has_application = groups.has_application(group.id, auth.user_id).await?;

        match join_decision(&group, is_member, has_application)? {
            JoinOutcome::Joined => {
                groups.add_member(group.id, auth.user_id, false).await?;
                Ok((StatusCode::CREATED, Json(JoinResponse { status: "joined" })).into_response())
            }
            JoinOutcome::Applied => {
                groups.create_application(group.id, auth.user_id).await?;
                Ok((StatusCode::ACCEPTED, Json(JoinResponse { status: "applied" })).into_response())
            }
        }
    }

    /// Handle POST /api/v1/groups/:id/leave - the last member leaving removes the group
    async fn handle_leave(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let group = Self::load_group(&resources, &id).await?;
        let outcome = resources
            .database
            .groups()
            .leave_group(group.id, auth.user_id)
            .await?;
        if outcome == LeaveOutcome::GroupDeleted {
            tracing::info!(group_id = %group.id, "Last member left, group deleted");
        }
        Ok(no_content())
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Handle GET /api/v1/groups/:id/members
    ///
    /// Private groups show their members to members only.
    async fn handle_list_members(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let group = Self::load_group(&resources, &id).await?;
        let members = resources.database.groups().list_members(group.id).await?;
        if !group.public && !members.iter().any(|m| m.user_id == auth.user_id) {
            return Err(AppError::permission_denied(
                "Only members may see the members of a private group",
            ));
        }
        Ok((StatusCode::OK, Json(members)).into_response())
    }

    async fn handle_remove_member(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, user_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let group = Self::load_group(&resources, &id).await?;
        let target = parse_id(&user_id, "user")?;
        resources
            .database
            .groups()
            .remove_member(group.id, auth.user_id, target)
            .await?;
        Ok(no_content())
    }

    async fn handle_promote(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, user_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let group = Self::load_group(&resources, &id).await?;
        let target = parse_id(&user_id, "user")?;
        resources
            .database
            .groups()
            .set_admin(group.id, auth.user_id, target, true)
            .await?;
        Ok(no_content())
    }

    async fn handle_demote(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, user_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let group = Self::load_group(&resources, &id).await?;
        let target = parse_id(&user_id, "user")?;
        resources
            .database
            .groups()
            .set_admin(group.id, auth.user_id, target, false)
            .await?;
        Ok(no_content())
    }

    // ========================================================================
    // Applications
    // ========================================================================

    async fn handle_list_applications(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let (group, _) = Self::administered_group(&resources, &id, auth.user_id).await?;
        let applications = resources.database.groups().list_applications(group.id).await?;
        Ok((StatusCode::OK, Json(applications)).into_response())
    }

    async fn handle_accept_application(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, user_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let (group, _) = Self::administered_group(&resources, &id, auth.user_id).await?;
        let applicant = parse_id(&user_id, "user")?;
        resources
            .database
            .groups()
            .accept_application(group.id, applicant)
            .await?;
        tracing::info!(group_id = %group.id, user_id = %applicant, "Accepted group application");
        Ok(no_content())
    }

    async fn handle_decline_application(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, user_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let (group, _) = Self::administered_group(&resources, &id, auth.user_id).await?;
        let applicant = parse_id(&user_id, "user")?;
        resources
            .database
            .groups()
            .delete_application(group.id, applicant)
            .await?;
        Ok(no_content())
    }
}
