// ABOUTME: Shared server resources handed to every route as axum state
// ABOUTME: Owns the database handle, auth manager, auth middleware and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::auth::{generate_jwt_secret, AuthManager};
use crate::config::ServerConfig;
use crate::constants::JWT_SECRET_KEY;
use crate::database::Database;
use crate::errors::AppResult;
use crate::middleware::AuthMiddleware;
use std::sync::Arc;
use tracing::info;

/// Resources shared by all request handlers
pub struct ServerResources {
    /// Database handle
    pub database: Arc<Database>,
    /// Token and password handling
    pub auth_manager: Arc<AuthManager>,
    /// Bearer token authentication
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wrap already constructed components
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: Arc<ServerConfig>) -> Self {
        let database = Arc::new(database);
        let auth_middleware = Arc::new(AuthMiddleware::new(
            auth_manager.clone(),
            Arc::clone(&database),
        ));
        Self {
            database,
            auth_manager: Arc::new(auth_manager),
            auth_middleware,
            config,
        }
    }

    /// Connect to the database and build the auth stack from configuration
    ///
    /// The JWT secret comes from the configuration when set, otherwise it is
    /// generated on first start and kept in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn initialize(config: ServerConfig) -> AppResult<Self> {
        let url = config.database.url.to_connection_string();
        let database = Database::connect(&url).await?;
        if config.database.auto_migrate {
            database.migrate().await?;
        }

        let secret = match &config.auth.jwt_secret {
            Some(secret) => secret.clone(),
            None => {
                info!("JWT_SECRET not set, using the secret stored in the database");
                database
                    .get_or_create_system_secret(JWT_SECRET_KEY, generate_jwt_secret)
                    .await?
            }
        };

        let auth_manager = AuthManager::new(
            secret.as_bytes(),
            config.auth.jwt_expiry_hours,
            config.auth.bcrypt_cost,
        );
        Ok(Self::new(database, auth_manager, Arc::new(config)))
    }
}
