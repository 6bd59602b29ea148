// ABOUTME: JWT-based user authentication for the workout manager API
// ABOUTME: Issues and validates HS256 access tokens and hashes passwords with bcrypt
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! # Authentication
//!
//! Access tokens are HS256 JWTs signed with a shared secret. The secret comes
//! from `JWT_SECRET` or is generated once and kept in the database. Password
//! hashing runs on the blocking thread pool so request workers stay free.

use crate::constants::service_names;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use workout_core::models::User;
use workout_core::permissions::UserRole;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone, thiserror::Error)]
pub enum JwtValidationError {
    /// Token has expired
    #[error("JWT token expired at {}", expired_at.format("%Y-%m-%d %H:%M:%S UTC"))]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Token signature or claims are invalid
    #[error("JWT token is invalid: {reason}")]
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is not a well formed `JWT`
    #[error("JWT token is malformed: {details}")]
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl From<JwtValidationError> for AppError {
    fn from(err: JwtValidationError) -> Self {
        match err {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            JwtValidationError::TokenInvalid { .. } => Self::auth_invalid(err.to_string()),
            JwtValidationError::TokenMalformed { .. } => {
                Self::new(workout_core::errors::ErrorCode::AuthMalformed, err.to_string())
            }
        }
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// Login name
    pub username: String,
    /// Role at issue time, informational only
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience
    pub aud: String,
}

impl Claims {
    /// Parse the subject as a user ID
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` when the subject is not a UUID
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a valid user ID"))
    }
}

/// Authenticated caller resolved from a request
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// Login name
    pub username: String,
    /// Current role from the database
    pub role: UserRole,
    /// Gym from the user's profile
    pub gym_id: Option<Uuid>,
}

impl AuthResult {
    /// Principal used by the permission checks
    #[must_use]
    pub const fn principal(&self) -> workout_core::permissions::Principal {
        workout_core::permissions::Principal {
            user_id: self.user_id,
            role: self.role,
            gym_id: self.gym_id,
        }
    }
}

/// Token returned by register, login and guest endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Expiry of the token
    pub expires_at: DateTime<Utc>,
    /// User the token belongs to
    pub user_id: Uuid,
    /// Login name
    pub username: String,
}

/// Authentication manager for `JWT` tokens and password hashes
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("token_expiry_hours", &self.token_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64, bcrypt_cost: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            bcrypt_cost,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_audience(&[service_names::WORKOUT_MANAGER_SERVER]);
        validation
    }

    /// Generate an access token for a user
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            aud: service_names::WORKOUT_MANAGER_SERVER.to_owned(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))?;

        Ok(TokenResponse {
            access_token: token,
            token_type: "Bearer".to_owned(),
            expires_at,
            user_id: user.id,
            username: user.username.clone(),
        })
    }

    /// Validate a token with detailed error information
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] for malformed, tampered or expired
    /// tokens
    pub fn validate_token_detailed(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Self::validation())
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))?;

        let now = Utc::now();
        if now.timestamp() > claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(now);
            tracing::debug!(user.id = %claims.sub, "Rejected expired token");
            return Err(JwtValidationError::TokenExpired { expired_at });
        }

        Ok(claims)
    }

    /// Validate a token, mapping failures to `AppError`
    ///
    /// # Errors
    ///
    /// Returns an authentication error for invalid tokens
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        Ok(self.validate_token_detailed(token)?)
    }

    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::debug!("JWT token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtValidationError::TokenMalformed {
                details: e.to_string(),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: e.to_string(),
            },
        }
    }

    /// Hash a password on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an internal error if hashing fails or the task panics
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Check a password against a stored hash on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an internal error if the stored hash is unreadable
    pub async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))
    }
}

/// Generate a random secret for signing tokens
#[must_use]
pub fn generate_jwt_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Random suffix for generated guest names and passwords
#[must_use]
pub fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_owned(),
            email: Some("alice@example.com".to_owned()),
            password_hash: String::new(),
            role: UserRole::User,
            is_active: true,
            created_at: Utc::now(),
            last_active: Utc::now(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let manager = AuthManager::new(b"secret", 1, 4);
        let user = user();
        let token = manager.generate_token(&user).unwrap();
        let claims = manager.validate_token(&token.access_token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_expired_and_foreign_tokens_rejected() {
        let user = user();
        let expired = AuthManager::new(b"secret", -1, 4)
            .generate_token(&user)
            .unwrap();
        let manager = AuthManager::new(b"secret", 1, 4);
        assert!(matches!(
            manager.validate_token_detailed(&expired.access_token),
            Err(JwtValidationError::TokenExpired { .. })
        ));

        let foreign = AuthManager::new(b"other", 1, 4).generate_token(&user).unwrap();
        assert!(matches!(
            manager.validate_token_detailed(&foreign.access_token),
            Err(JwtValidationError::TokenInvalid { .. })
        ));
        assert!(manager.validate_token("not-a-token").is_err());
    }

    #[tokio::test]
    async fn test_password_hashing() {
        let manager = AuthManager::new(b"secret", 1, 4);
        let hash = manager.hash_password("correct horse").await.unwrap();
        assert!(manager.verify_password("correct horse", &hash).await.unwrap());
        assert!(!manager.verify_password("wrong", &hash).await.unwrap());
    }
}
