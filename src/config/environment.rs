// ABOUTME: Environment configuration for the workout manager server
// ABOUTME: Parses ports, database location, JWT and CORS settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Environment-based configuration

use crate::constants::{defaults, server_defaults};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database file
    SQLite {
        /// File path
        path: PathBuf,
    },
    /// In-memory SQLite, used by tests
    Memory,
}

impl DatabaseUrl {
    /// Parse `sqlite:<path>`, `sqlite::memory:` or a bare file path
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path = s.strip_prefix("sqlite://").or_else(|| s.strip_prefix("sqlite:")).unwrap_or(s);
        if path == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path),
            }
        }
    }

    /// Connection string understood by sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Whether the database lives in memory
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::parse_url(server_defaults::DATABASE_URL)
    }
}

/// Database section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Create tables on startup
    pub auto_migrate: bool,
}

/// Authentication section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret, generated and stored in the database when unset
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,
    /// Access token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor for password hashes
    pub bcrypt_cost: u32,
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Allowed CORS origins, `*` for any
    pub cors_allowed_origins: Vec<String>,
    /// Guest accounts older than this are removed by `delete-temp-users`
    pub temp_user_max_age_days: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: env_var_or("HTTP_PORT", &server_defaults::HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or(
                    "DATABASE_URL",
                    server_defaults::DATABASE_URL,
                )),
                auto_migrate: env_var_or("AUTO_MIGRATE", "true")
                    .parse()
                    .context("Invalid AUTO_MIGRATE value")?,
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
                jwt_expiry_hours: env_var_or(
                    "JWT_EXPIRY_HOURS",
                    &server_defaults::JWT_EXPIRY_HOURS.to_string(),
                )
                .parse()
                .context("Invalid JWT_EXPIRY_HOURS value")?,
                bcrypt_cost: env_var_or("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())
                    .parse()
                    .context("Invalid BCRYPT_COST value")?,
            },
            cors_allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")),
            temp_user_max_age_days: env_var_or(
                "TEMP_USER_MAX_AGE_DAYS",
                &defaults::TEMP_USER_MAX_AGE_DAYS.to_string(),
            )
            .parse()
            .context("Invalid TEMP_USER_MAX_AGE_DAYS value")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that cannot work at runtime
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive token lifetime, a bcrypt cost
    /// outside 4..=31 or a negative guest age
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_expiry_hours <= 0 {
            anyhow::bail!("JWT_EXPIRY_HOURS must be positive");
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            anyhow::bail!("BCRYPT_COST must be between 4 and 31");
        }
        if self.temp_user_max_age_days < 0 {
            anyhow::bail!("TEMP_USER_MAX_AGE_DAYS cannot be negative");
        }
        Ok(())
    }

    /// Configuration for tests: in-memory database and a fixed secret
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            http_port: 0,
            database: DatabaseConfig {
                url: DatabaseUrl::Memory,
                auto_migrate: true,
            },
            auth: AuthConfig {
                jwt_secret: Some("test-secret-for-integration-tests".to_owned()),
                jwt_expiry_hours: server_defaults::JWT_EXPIRY_HOURS,
                bcrypt_cost: 4,
            },
            cors_allowed_origins: vec!["*".to_owned()],
            temp_user_max_age_days: defaults::TEMP_USER_MAX_AGE_DAYS,
        }
    }

    /// Human readable summary for the startup log
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Workout Manager Configuration:\n\
             - HTTP Port: {}\n\
             - Database: {}\n\
             - JWT Secret: {}\n\
             - Token Lifetime: {}h\n\
             - CORS Origins: {}\n\
             - Guest Account Max Age: {} days",
            self.http_port,
            self.database.url.to_connection_string(),
            if self.auth.jwt_secret.is_some() {
                "from environment"
            } else {
                "stored in database"
            },
            self.auth.jwt_expiry_hours,
            self.cors_allowed_origins.join(", "),
            self.temp_user_max_age_days,
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse comma-separated CORS origins
fn parse_origins(origins: &str) -> Vec<String> {
    if origins.trim() == "*" {
        return vec!["*".to_owned()];
    }
    origins
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parsing() {
        assert_eq!(DatabaseUrl::parse_url("sqlite::memory:"), DatabaseUrl::Memory);
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./data/app.db").to_connection_string(),
            "sqlite:./data/app.db"
        );
        assert_eq!(
            DatabaseUrl::parse_url("app.db"),
            DatabaseUrl::SQLite {
                path: PathBuf::from("app.db")
            }
        );
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://a.example, http://b.example,"),
            vec!["http://a.example", "http://b.example"]
        );
    }
}
