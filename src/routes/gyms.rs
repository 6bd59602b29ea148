// ABOUTME: Gym routes for members, configuration, admin notes and contracts
// ABOUTME: Trainers and managers act only on their own gym, general managers on every gym
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Gym administration routes
//!
//! Staff membership is taken from the caller's profile. Trainers may read
//! member overviews and notes; contracts, configuration and membership
//! changes need a manager of the gym.

use super::{authenticate, no_content, parse_id, today, validate_name};
use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use workout_core::gym::validate_contract;
use workout_core::models::{
    AdminUserNote, Contract, ContractOption, ContractType, Gym, GymAdminConfig, GymConfig,
    GymUserConfig, PaymentInterval,
};
use workout_core::permissions::{Permissions, UserRole};

/// Gym fields
#[derive(Debug, Deserialize)]
pub struct GymRequest {
    /// Name, unique
    pub name: String,
    /// Phone
    pub phone: Option<String>,
    /// Email
    pub email: Option<String>,
    /// Owner
    pub owner: Option<String>,
    /// Zip code
    pub zip_code: Option<String>,
    /// City
    pub city: Option<String>,
    /// Street
    pub street: Option<String>,
}

/// Member overview filters
#[derive(Debug, Default, Deserialize)]
pub struct MemberQuery {
    /// Only inactive members that opted into inactivity reports
    #[serde(default)]
    pub inactive: bool,
}

/// Role change of a member
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    /// New role
    pub role: UserRole,
}

/// Account activation of a member
#[derive(Debug, Deserialize)]
pub struct ActiveRequest {
    /// Whether the member may log in
    pub is_active: bool,
}

/// Gym configuration fields
#[derive(Debug, Deserialize)]
pub struct ConfigRequest {
    /// Weeks without training after which a member is inactive
    pub weeks_inactive: u32,
}

/// Staff preference fields
#[derive(Debug, Deserialize)]
pub struct AdminConfigRequest {
    /// Show inactive members in the overview
    pub overview_inactive: bool,
}

/// Member preference fields
#[derive(Debug, Deserialize)]
pub struct UserConfigRequest {
    /// Appear in inactivity reports
    pub include_inactive: bool,
}

/// Admin note text
#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    /// Note
    pub note: String,
}

/// Contract type or option fields
#[derive(Debug, Deserialize)]
pub struct CatalogRequest {
    /// Name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
}

/// Contract fields
#[derive(Debug, Deserialize)]
pub struct ContractRequest {
    /// Contract type of the same gym
    pub contract_type_id: Option<Uuid>,
    /// Options of the same gym
    #[serde(default)]
    pub options: Vec<Uuid>,
    /// Amount charged per interval
    pub amount: f64,
    /// Payment interval
    #[serde(default)]
    pub payment: PaymentInterval,
    /// Whether the contract is running
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// First day
    pub date_start: NaiveDate,
    /// Last day
    pub date_end: Option<NaiveDate>,
    /// Contact email
    pub email: Option<String>,
    /// Zip code
    pub zip_code: Option<String>,
    /// City
    pub city: Option<String>,
    /// Street
    pub street: Option<String>,
    /// Phone
    pub phone: Option<String>,
    /// Profession
    pub profession: Option<String>,
    /// Free text
    pub note: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl ContractRequest {
    fn apply(self, contract: &mut Contract) {
        contract.contract_type_id = self.contract_type_id;
        contract.options = self.options;
        contract.amount = self.amount;
        contract.payment = self.payment;
        contract.is_active = self.is_active;
        contract.date_start = self.date_start;
        contract.date_end = self.date_end;
        contract.email = self.email;
        contract.zip_code = self.zip_code;
        contract.city = self.city;
        contract.street = self.street;
        contract.phone = self.phone;
        contract.profession = self.profession;
        contract.note = self.note;
    }
}

/// Gym routes
pub struct GymRoutes;

impl GymRoutes {
    /// Create the gym routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/gyms", get(Self::handle_list_gyms).post(Self::handle_create_gym))
            .route(
                "/api/v1/gyms/:id",
                get(Self::handle_get_gym)
                    .put(Self::handle_update_gym)
                    .delete(Self::handle_delete_gym),
            )
            .route("/api/v1/gyms/:id/members", get(Self::handle_list_members))
            .route(
                "/api/v1/gyms/:id/members/:user_id",
                put(Self::handle_add_member).delete(Self::handle_remove_member),
            )
            .route(
                "/api/v1/gyms/:id/members/:user_id/role",
                put(Self::handle_set_member_role),
            )
            .route(
                "/api/v1/gyms/:id/members/:user_id/active",
                put(Self::handle_set_member_active),
            )
            .route(
                "/api/v1/gyms/:id/config",
                get(Self::handle_get_config).put(Self::handle_update_config),
            )
            .route(
                "/api/v1/gyms/:id/admin-config",
                get(Self::handle_get_admin_config).put(Self::handle_update_admin_config),
            )
            .route(
                "/api/v1/gyms/:id/user-config",
                get(Self::handle_get_user_config).put(Self::handle_update_user_config),
            )
            .route(
                "/api/v1/gyms/:id/contract-types",
                get(Self::handle_list_contract_types).post(Self::handle_create_contract_type),
            )
            .route(
                "/api/v1/contract-types/:id",
                put(Self::handle_update_contract_type).delete(Self::handle_delete_contract_type),
            )
            .route(
                "/api/v1/gyms/:id/contract-options",
                get(Self::handle_list_contract_options).post(Self::handle_create_contract_option),
            )
            .route(
                "/api/v1/contract-options/:id",
                put(Self::handle_update_contract_option)
                    .delete(Self::handle_delete_contract_option),
            )
            .route(
                "/api/v1/members/:user_id/notes",
                get(Self::handle_list_notes).post(Self::handle_create_note),
            )
            .route(
                "/api/v1/notes/:id",
                put(Self::handle_update_note).delete(Self::handle_delete_note),
            )
            .route(
                "/api/v1/members/:user_id/contracts",
                get(Self::handle_list_contracts).post(Self::handle_create_contract),
            )
            .route(
                "/api/v1/contracts/:id",
                get(Self::handle_get_contract)
                    .put(Self::handle_update_contract)
                    .delete(Self::handle_delete_contract),
            )
            .with_state(resources)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    async fn load_gym(resources: &ServerResources, id: &str) -> AppResult<Gym> {
        let gym_id = parse_id(id, "gym")?;
        resources
            .database
            .gyms()
            .get_gym(gym_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Gym {gym_id}")))
    }

    /// Gym of a member, failing when the user belongs to none
    async fn member_gym(resources: &ServerResources, member_id: Uuid) -> AppResult<Uuid> {
        resources
            .database
            .users()
            .get_user(member_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {member_id}")))?;
        resources
            .database
            .users()
            .get_profile(member_id)
            .await?
            .gym_id
            .ok_or_else(|| AppError::invalid_input("The user is not a member of any gym"))
    }

    /// Member of the gym given in the path, checked against the member's profile
    async fn gym_member(
        resources: &ServerResources,
        gym_id: Uuid,
        user_id: &str,
    ) -> AppResult<Uuid> {
        let member_id = parse_id(user_id, "user")?;
        if Self::member_gym(resources, member_id).await? != gym_id {
            return Err(AppError::not_found(format!("Gym member {member_id}")));
        }
        Ok(member_id)
    }

    fn from_request(id: Uuid, body: GymRequest) -> Gym {
        Gym {
            id,
            name: body.name.trim().to_owned(),
            phone: body.phone,
            email: body.email,
            owner: body.owner,
            zip_code: body.zip_code,
            city: body.city,
            street: body.street,
        }
    }

    // ========================================================================
    // Gyms
    // ========================================================================

    /// Handle GET /api/v1/gyms
    ///
    /// General managers see every gym, everyone else only the gym of their
    /// own profile.
    async fn handle_list_gyms(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gyms = resources.database.gyms();
        let list = if auth.principal().has(Permissions::MANAGE_GYMS) {
            gyms.list_gyms().await?
        } else if let Some(gym_id) = auth.gym_id {
            gyms.get_gym(gym_id).await?.into_iter().collect()
        } else {
            Vec::new()
        };
        Ok((StatusCode::OK, Json(list)).into_response())
    }

    async fn handle_create_gym(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<GymRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        auth.principal().require(Permissions::MANAGE_GYMS)?;
        validate_name("name", &body.name)?;

        let gym = Self::from_request(Uuid::new_v4(), body);
        resources.database.gyms().create_gym(&gym).await?;
        tracing::info!(gym_id = %gym.id, name = %gym.name, "Created gym");
        Ok((StatusCode::CREATED, Json(gym)).into_response())
    }

    async fn handle_get_gym(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        if auth.gym_id != Some(gym.id) {
            auth.principal().require_gym_staff(gym.id)?;
        }
        Ok((StatusCode::OK, Json(gym)).into_response())
    }

    async fn handle_update_gym(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<GymRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_manager(gym.id)?;
        validate_name("name", &body.name)?;

        let updated = Self::from_request(gym.id, body);
        resources.database.gyms().update_gym(&updated).await?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    }

    async fn handle_delete_gym(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        auth.principal().require(Permissions::MANAGE_GYMS)?;
        let gym = Self::load_gym(&resources, &id).await?;
        resources.database.gyms().delete_gym(gym.id).await?;
        tracing::info!(gym_id = %gym.id, "Deleted gym");
        Ok(no_content())
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Handle GET /api/v1/gyms/:id/members
    async fn handle_list_members(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Query(query): Query<MemberQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_staff(gym.id)?;

        let mut members = resources.database.gyms().member_activity(gym.id, today()).await?;
        if query.inactive {
            members.retain(|m| m.inactive && m.include_inactive);
        }
        Ok((StatusCode::OK, Json(members)).into_response())
    }

    async fn handle_add_member(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, user_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_manager(gym.id)?;

        let member_id = parse_id(&user_id, "user")?;
        let users = resources.database.users();
        users
            .get_user(member_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {member_id}")))?;
        if let Some(current) = users.get_profile(member_id).await?.gym_id {
            if current != gym.id {
                return Err(AppError::conflict("The user already belongs to another gym"));
            }
        }
        users.set_gym(member_id, Some(gym.id)).await?;
        tracing::info!(gym_id = %gym.id, member_id = %member_id, "Added gym member");
        Ok(no_content())
    }

    async fn handle_remove_member(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, user_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_manager(gym.id)?;
        let member_id = Self::gym_member(&resources, gym.id, &user_id).await?;
        resources.database.users().set_gym(member_id, None).await?;
        Ok(no_content())
    }

    /// Handle PUT /api/v1/gyms/:id/members/:user_id/role
    ///
    /// Gym managers may hand out member, trainer and gym manager roles. Roles
    /// spanning every gym need a general manager.
    async fn handle_set_member_role(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, user_id)): Path<(String, String)>,
        Json(body): Json<RoleRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        let principal = auth.principal();
        principal.require_gym_manager(gym.id)?;
        match body.role {
            UserRole::Admin => principal.require(Permissions::all())?,
            UserRole::GeneralManager => principal.require(Permissions::MANAGE_GYMS)?,
            UserRole::User | UserRole::Trainer | UserRole::GymManager => {}
        }
        let member_id = Self::gym_member(&resources, gym.id, &user_id).await?;
        if member_id == auth.user_id {
            return Err(AppError::invalid_input("You cannot change your own role"));
        }
        resources.database.users().set_role(member_id, body.role).await?;
        tracing::info!(member_id = %member_id, role = body.role.as_str(), "Changed member role");
        Ok(no_content())
    }

    async fn handle_set_member_active(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, user_id)): Path<(String, String)>,
        Json(body): Json<ActiveRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_manager(gym.id)?;
        let member_id = Self::gym_member(&resources, gym.id, &user_id).await?;
        if member_id == auth.user_id {
            return Err(AppError::invalid_input("You cannot deactivate your own account"));
        }
        resources.database.users().set_active(member_id, body.is_active).await?;
        Ok(no_content())
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    async fn handle_get_config(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_staff(gym.id)?;
        let config = resources.database.gyms().get_config(gym.id).await?;
        Ok((StatusCode::OK, Json(config)).into_response())
    }

    async fn handle_update_config(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<ConfigRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_manager(gym.id)?;
        if body.weeks_inactive == 0 {
            return Err(AppError::invalid_field(
                "weeks_inactive",
                "Must be at least one week",
            ));
        }
        let config = GymConfig {
            gym_id: gym.id,
            weeks_inactive: body.weeks_inactive,
        };
        resources.database.gyms().update_config(&config).await?;
        Ok((StatusCode::OK, Json(config)).into_response())
    }

    async fn handle_get_admin_config(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_staff(gym.id)?;
        let config = resources
            .database
            .gyms()
            .get_admin_config(auth.user_id, gym.id)
            .await?;
        Ok((StatusCode::OK, Json(config)).into_response())
    }

    async fn handle_update_admin_config(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<AdminConfigRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_staff(gym.id)?;
        let config = GymAdminConfig {
            user_id: auth.user_id,
            gym_id: gym.id,
            overview_inactive: body.overview_inactive,
        };
        resources.database.gyms().set_admin_config(&config).await?;
        Ok((StatusCode::OK, Json(config)).into_response())
    }

    fn require_own_gym(auth: &AuthResult, gym_id: Uuid) -> AppResult<()> {
        if auth.gym_id == Some(gym_id) {
            Ok(())
        } else {
            Err(AppError::permission_denied("You are not a member of this gym"))
        }
    }

    async fn handle_get_user_config(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        Self::require_own_gym(&auth, gym.id)?;
        let config = resources
            .database
            .gyms()
            .get_user_config(auth.user_id, gym.id)
            .await?;
        Ok((StatusCode::OK, Json(config)).into_response())
    }

    async fn handle_update_user_config(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<UserConfigRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        Self::require_own_gym(&auth, gym.id)?;
        let config = GymUserConfig {
            user_id: auth.user_id,
            gym_id: gym.id,
            include_inactive: body.include_inactive,
        };
        resources.database.gyms().set_user_config(&config).await?;
        Ok((StatusCode::OK, Json(config)).into_response())
    }

    // ========================================================================
    // Contract types and options
    // ========================================================================

    async fn handle_list_contract_types(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_staff(gym.id)?;
        let kinds = resources.database.gyms().list_contract_types(gym.id).await?;
        Ok((StatusCode::OK, Json(kinds)).into_response())
    }

    async fn handle_create_contract_type(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<CatalogRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_manager(gym.id)?;
        validate_name("name", &body.name)?;

        let kind = ContractType {
            id: Uuid::new_v4(),
            gym_id: gym.id,
            name: body.name.trim().to_owned(),
            description: body.description,
        };
        resources.database.gyms().create_contract_type(&kind).await?;
        Ok((StatusCode::CREATED, Json(kind)).into_response())
    }

    async fn writable_contract_type(
        resources: &ServerResources,
        auth: &AuthResult,
        id: &str,
    ) -> AppResult<ContractType> {
        let kind = resources
            .database
            .gyms()
            .get_contract_type(parse_id(id, "contract type")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Contract type {id}")))?;
        auth.principal().require_gym_manager(kind.gym_id)?;
        Ok(kind)
    }

    async fn handle_update_contract_type(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<CatalogRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut kind = Self::writable_contract_type(&resources, &auth, &id).await?;
        validate_name("name", &body.name)?;
        kind.name = body.name.trim().to_owned();
        kind.description = body.description;
        resources.database.gyms().update_contract_type(&kind).await?;
        Ok((StatusCode::OK, Json(kind)).into_response())
    }

    async fn handle_delete_contract_type(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let kind = Self::writable_contract_type(&resources, &auth, &id).await?;
        resources.database.gyms().delete_contract_type(kind.id).await?;
        Ok(no_content())
    }

    async fn handle_list_contract_options(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_staff(gym.id)?;
        let options = resources.database.gyms().list_contract_options(gym.id).await?;
        Ok((StatusCode::OK, Json(options)).into_response())
    }

    async fn handle_create_contract_option(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<CatalogRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let gym = Self::load_gym(&resources, &id).await?;
        auth.principal().require_gym_manager(gym.id)?;
        validate_name("name", &body.name)?;

        let option = ContractOption {
            id: Uuid::new_v4(),
            gym_id: gym.id,
            name: body.name.trim().to_owned(),
            description: body.description,
        };
        resources.database.gyms().create_contract_option(&option).await?;
        Ok((StatusCode::CREATED, Json(option)).into_response())
    }

    async fn writable_contract_option(
        resources: &ServerResources,
        auth: &AuthResult,
        id: &str,
    ) -> AppResult<ContractOption> {
        let option = resources
            .database
            .gyms()
            .get_contract_option(parse_id(id, "contract option")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Contract option {id}")))?;
        auth.principal().require_gym_manager(option.gym_id)?;
        Ok(option)
    }

    async fn handle_update_contract_option(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<CatalogRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut option = Self::writable_contract_option(&resources, &auth, &id).await?;
        validate_name("name", &body.name)?;
        option.name = body.name.trim().to_owned();
        option.description = body.description;
        resources.database.gyms().update_contract_option(&option).await?;
        Ok((StatusCode::OK, Json(option)).into_response())
    }

    async fn handle_delete_contract_option(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let option = Self::writable_contract_option(&resources, &auth, &id).await?;
        resources.database.gyms().delete_contract_option(option.id).await?;
        Ok(no_content())
    }

    // ========================================================================
    // Admin notes
    // ========================================================================

    async fn handle_list_notes(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let member_id = parse_id(&user_id, "user")?;
        let gym_id = Self::member_gym(&resources, member_id).await?;
        auth.principal().require_gym_staff(gym_id)?;
        let notes = resources.database.gyms().list_notes(member_id).await?;
        Ok((StatusCode::OK, Json(notes)).into_response())
    }

    async fn handle_create_note(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
        Json(body): Json<NoteRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let member_id = parse_id(&user_id, "user")?;
        let gym_id = Self::member_gym(&resources, member_id).await?;
        auth.principal().require_gym_staff(gym_id)?;
        if body.note.trim().is_empty() {
            return Err(AppError::invalid_field("note", "This field may not be blank"));
        }

        let now = Utc::now();
        let note = AdminUserNote {
            id: Uuid::new_v4(),
            member_id,
            author_id: auth.user_id,
            note: body.note,
            created_at: now,
            edited_at: now,
            edited_by: auth.user_id,
        };
        resources.database.gyms().create_note(&note).await?;
        Ok((StatusCode::CREATED, Json(note)).into_response())
    }

    async fn writable_note(
        resources: &ServerResources,
        auth: &AuthResult,
        id: &str,
    ) -> AppResult<AdminUserNote> {
        let note = resources
            .database
            .gyms()
            .get_note(parse_id(id, "note")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Note {id}")))?;
        let gym_id = Self::member_gym(resources, note.member_id).await?;
        auth.principal().require_gym_staff(gym_id)?;
        Ok(note)
    }

    async fn handle_update_note(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<NoteRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let note = Self::writable_note(&resources, &auth, &id).await?;
        if body.note.trim().is_empty() {
            return Err(AppError::invalid_field("note", "This field may not be blank"));
        }
        let updated = resources
            .database
            .gyms()
            .update_note(note.id, &body.note, auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    }

    async fn handle_delete_note(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let note = Self::writable_note(&resources, &auth, &id).await?;
        resources.database.gyms().delete_note(note.id).await?;
        Ok(no_content())
    }

    // ========================================================================
    // Contracts
    // ========================================================================

    /// Type and options of a contract must belong to the contract's gym
    async fn validate_contract_refs(
        resources: &ServerResources,
        contract: &Contract,
    ) -> AppResult<()> {
        validate_contract(contract)?;
        let gyms = resources.database.gyms();
        if let Some(type_id) = contract.contract_type_id {
            let kind = gyms
                .get_contract_type(type_id)
                .await?
                .ok_or_else(|| {
                    AppError::invalid_field("contract_type_id", "Unknown contract type")
                })?;
            if kind.gym_id != contract.gym_id {
                return Err(AppError::invalid_field(
                    "contract_type_id",
                    "The contract type belongs to another gym",
                ));
            }
        }
        for option_id in &contract.options {
            let option = gyms
                .get_contract_option(*option_id)
                .await?
                .ok_or_else(|| {
                    AppError::invalid_field(
                        "options",
                        format!("Unknown contract option {option_id}"),
                    )
                })?;
            if option.gym_id != contract.gym_id {
                return Err(AppError::invalid_field(
                    "options",
                    "A contract option belongs to another gym",
                ));
            }
        }
        Ok(())
    }

    async fn handle_list_contracts(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let member_id = parse_id(&user_id, "user")?;
        if member_id != auth.user_id {
            let gym_id = Self::member_gym(&resources, member_id).await?;
            auth.principal().require_gym_staff(gym_id)?;
        }
        let contracts = resources.database.gyms().list_contracts(member_id).await?;
        Ok((StatusCode::OK, Json(contracts)).into_response())
    }

    async fn handle_create_contract(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
        Json(body): Json<ContractRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let member_id = parse_id(&user_id, "user")?;
        let gym_id = Self::member_gym(&resources, member_id).await?;
        auth.principal().require_gym_manager(gym_id)?;

        let mut contract = Contract {
            id: Uuid::new_v4(),
            gym_id,
            member_id,
            author_id: auth.user_id,
            contract_type_id: None,
            options: Vec::new(),
            amount: 0.0,
            payment: PaymentInterval::default(),
            is_active: true,
            date_start: today(),
            date_end: None,
            email: None,
            zip_code: None,
            city: None,
            street: None,
            phone: None,
            profession: None,
            note: None,
            created_at: Utc::now(),
        };
        body.apply(&mut contract);
        Self::validate_contract_refs(&resources, &contract).await?;

        resources.database.gyms().create_contract(&contract).await?;
        Ok((StatusCode::CREATED, Json(contract)).into_response())
    }

    async fn load_contract(resources: &ServerResources, id: &str) -> AppResult<Contract> {
        resources
            .database
            .gyms()
            .get_contract(parse_id(id, "contract")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Contract {id}")))
    }

    async fn handle_get_contract(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let contract = Self::load_contract(&resources, &id).await?;
        if contract.member_id != auth.user_id {
            auth.principal().require_gym_staff(contract.gym_id)?;
        }
        Ok((StatusCode::OK, Json(contract)).into_response())
    }

    async fn handle_update_contract(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<ContractRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut contract = Self::load_contract(&resources, &id).await?;
        auth.principal().require_gym_manager(contract.gym_id)?;
        body.apply(&mut contract);
        Self::validate_contract_refs(&resources, &contract).await?;
        resources.database.gyms().update_contract(&contract).await?;
        Ok((StatusCode::OK, Json(contract)).into_response())
    }

    async fn handle_delete_contract(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let contract = Self::load_contract(&resources, &id).await?;
        auth.principal().require_gym_manager(contract.gym_id)?;
        resources.database.gyms().delete_contract(contract.id).await?;
        Ok(no_content())
    }
}
