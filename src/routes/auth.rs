// ABOUTME: Account routes for registration, login and guest accounts
// ABOUTME: Issues bearer tokens and converts guest accounts into regular ones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Authentication routes
//!
//! Registration and login return a [`TokenResponse`]. Guest accounts get a
//! generated username and a random password nobody knows; they are removed
//! by `workout-cli user delete-temporary` unless converted first.

use super::{authenticate, validate_name};
use crate::auth::{random_token, TokenResponse};
use crate::constants::MIN_PASSWORD_LENGTH;
use crate::database::users::NewUser;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use workout_core::permissions::UserRole;

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login name
    pub username: String,
    /// Optional contact address
    pub email: Option<String>,
    /// Plain text password
    pub password: String,
}

/// Login request, `username` may also hold the email address
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub username: String,
    /// Plain text password
    pub password: String,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create the account routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/auth/register", post(Self::handle_register))
            .route("/api/v1/auth/login", post(Self::handle_login))
            .route("/api/v1/auth/guest", post(Self::handle_guest))
            .route("/api/v1/auth/convert", post(Self::handle_convert_guest))
            .with_state(resources)
    }

    fn validate_credentials(request: &RegisterRequest) -> AppResult<()> {
        validate_name("username", &request.username)?;
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_field(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long"),
            ));
        }
        if let Some(email) = &request.email {
            if !email.contains('@') {
                return Err(AppError::invalid_field("email", "Enter a valid email address"));
            }
        }
        Ok(())
    }

    /// Handle POST /api/v1/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        Self::validate_credentials(&body)?;

        let password_hash = resources.auth_manager.hash_password(&body.password).await?;
        let user = resources
            .database
            .users()
            .create_user(&NewUser {
                username: body.username.trim().to_owned(),
                email: body.email.filter(|e| !e.is_empty()),
                password_hash,
                role: UserRole::User,
                is_temporary: false,
            })
            .await?;

        info!(user_id = %user.id, "Registered new user");
        let token = resources.auth_manager.generate_token(&user)?;
        Ok((StatusCode::CREATED, Json(token)).into_response())
    }

    /// Handle POST /api/v1/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .database
            .users()
            .get_user_by_login(body.username.trim())
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid username or password"))?;

        let valid = resources
            .auth_manager
            .verify_password(&body.password, &user.password_hash)
            .await?;
        if !valid || !user.is_active {
            return Err(AppError::auth_invalid("Invalid username or password"));
        }

        let token: TokenResponse = resources.auth_manager.generate_token(&user)?;
        Ok((StatusCode::OK, Json(token)).into_response())
    }

    /// Handle POST /api/v1/auth/guest - create a temporary account
    async fn handle_guest(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let password_hash = resources
            .auth_manager
            .hash_password(&random_token(32))
            .await?;
        let user = resources
            .database
            .users()
            .create_user(&NewUser {
                username: format!("guest-{}", random_token(10).to_lowercase()),
                email: None,
                password_hash,
                role: UserRole::User,
                is_temporary: true,
            })
            .await?;

        info!(user_id = %user.id, "Created guest account");
        let token = resources.auth_manager.generate_token(&user)?;
        Ok((StatusCode::CREATED, Json(token)).into_response())
    }

    /// Handle POST /api/v1/auth/convert - turn the calling guest into a regular user
    async fn handle_convert_guest(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let users = resources.database.users();
        if !users.get_profile(auth.user_id).await?.is_temporary {
            return Err(AppError::conflict("This account is not a guest account"));
        }
        Self::validate_credentials(&body)?;

        let password_hash = resources.auth_manager.hash_password(&body.password).await?;
        users
            .convert_guest(
                auth.user_id,
                body.username.trim(),
                body.email.as_deref().filter(|e| !e.is_empty()),
                &password_hash,
            )
            .await?;

        let user = users
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        info!(user_id = %user.id, "Converted guest account");
        let token = resources.auth_manager.generate_token(&user)?;
        Ok((StatusCode::OK, Json(token)).into_response())
    }
}
