// ABOUTME: Bearer token authentication for API requests
// ABOUTME: Validates the JWT, loads the user and profile, and produces the request principal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::auth::{AuthManager, AuthResult};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use axum::http::HeaderMap;
use std::sync::Arc;

/// Middleware for API authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: AuthManager,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: AuthManager, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its headers
    ///
    /// # Errors
    ///
    /// Returns an authentication error when the header is missing or invalid
    pub async fn authenticate_headers(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let auth_header = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        self.authenticate_request(auth_header).await
    }

    /// Authenticate an `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The header is missing or not a `Bearer` token
    /// - The token is expired, malformed or signed with another key
    /// - The user no longer exists or was deactivated
    #[tracing::instrument(
        skip(self, auth_header),
        fields(user_id = tracing::field::Empty, success = tracing::field::Empty)
    )]
    pub async fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let Some(header) = auth_header else {
            tracing::debug!("Authentication failed: missing authorization header");
            return Err(AppError::auth_required());
        };

        let Some(token) = header.strip_prefix("Bearer ") else {
            tracing::Span::current().record("success", false);
            tracing::warn!("Authentication failed: authorization header is not a bearer token");
            return Err(AppError::auth_invalid(
                "Invalid authorization header format - must be 'Bearer <token>'",
            ));
        };

        let claims = self.auth_manager.validate_token_detailed(token).map_err(|e| {
            tracing::Span::current().record("success", false);
            tracing::warn!("JWT authentication failed: {e}");
            AppError::from(e)
        })?;
        let user_id = claims.user_id()?;

        let users = self.database.users();
        let user = users
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("User no longer exists"))?;
        if !user.is_active {
            tracing::Span::current().record("success", false);
            return Err(AppError::auth_invalid("User account is disabled"));
        }
        let profile = users.get_profile(user_id).await?;
        users.touch_last_active(user_id).await?;

        tracing::Span::current()
            .record("user_id", user_id.to_string())
            .record("success", true);

        Ok(AuthResult {
            user_id,
            username: user.username,
            role: user.role,
            gym_id: profile.gym_id,
        })
    }
}
