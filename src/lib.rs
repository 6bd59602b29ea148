// ABOUTME: Main library entry point for the workout manager server
// ABOUTME: Multi-tenant REST API for workouts, nutrition, body weight, gyms and groups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

#![deny(unsafe_code)]

//! # Workout Manager
//!
//! A self-hosted fitness and nutrition tracker. Users plan workouts and
//! schedules, log their training, keep nutrition plans and a food diary and
//! record their body weight. Gyms group members under managers and trainers,
//! and user groups let members share and discuss.
//!
//! ## Architecture
//!
//! - **`workout-core`**: domain models, validation and pure calculations
//! - **Database**: one `sqlx` manager per domain over a shared `SQLite` pool
//! - **Routes**: axum route groups, one per domain, merged by [`server`]
//! - **Jobs**: reminders and temporary user cleanup run from `workout-cli`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use workout_manager::config::ServerConfig;
//! use workout_manager::resources::ServerResources;
//! use workout_manager::server::WorkoutServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let port = config.http_port;
//!     let resources = ServerResources::initialize(config).await?;
//!     WorkoutServer::new(Arc::new(resources)).run(port).await
//! }
//! ```

/// Password hashing and JWT session tokens
pub mod auth;

/// Environment driven server configuration
pub mod config;

/// Application constants and limits
pub mod constants;

/// `SQLite` persistence, one manager per domain
pub mod database;

/// Demo data generation
pub mod demo_data;

/// Error types and HTTP error responses
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Authentication, CORS and tracing middleware
pub mod middleware;

/// Workout and weight reminder job
pub mod reminders;

/// Shared server resources
pub mod resources;

/// REST API route groups
pub mod routes;

/// HTTP server assembly
pub mod server;

/// Body weight CSV import and export
pub mod weight_csv;
