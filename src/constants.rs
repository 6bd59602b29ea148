// ABOUTME: Application constants for the workout manager service
// ABOUTME: Re-exports domain limits from workout-core and adds HTTP and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! # Constants Module
//!
//! Validation limits and defaults live in `workout_core::constants` so that
//! the pure domain logic can use them; this module re-exports them next to
//! the constants that only the server needs.

pub use workout_core::constants::{defaults, energy, limits, reminders, units};

/// Service identifiers used in logs and health responses
pub mod service_names {
    /// HTTP server
    pub const WORKOUT_MANAGER_SERVER: &str = "workout-manager-server";
    /// Maintenance CLI
    pub const WORKOUT_CLI: &str = "workout-cli";
}

/// HTTP surface
pub mod http {
    /// Prefix of every REST endpoint
    pub const API_PREFIX: &str = "/api/v1";
    /// Header carrying the request correlation ID
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
    /// Header injected on every response
    pub const ROBOTS_HEADER: &str = "x-robots-tag";
    /// Crawlers must not index the API
    pub const ROBOTS_VALUE: &str = "noindex, nofollow";
    /// Maximum accepted request body (CSV uploads included)
    pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
    /// Per-request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// Environment driven defaults for the server configuration
pub mod server_defaults {
    /// HTTP port
    pub const HTTP_PORT: u16 = 8081;
    /// SQLite database location
    pub const DATABASE_URL: &str = "sqlite:./data/workout_manager.db";
    /// Access token lifetime
    pub const JWT_EXPIRY_HOURS: i64 = 24;
    /// Pool size for file databases
    pub const MAX_DB_CONNECTIONS: u32 = 10;
}

/// Key under which the generated JWT secret is stored
pub const JWT_SECRET_KEY: &str = "jwt_secret";

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;
