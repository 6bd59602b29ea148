// ABOUTME: Server binary for the workout manager REST API
// ABOUTME: Loads configuration from the environment, prepares the database and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! # Workout Manager Server Binary
//!
//! Starts the REST API with user authentication and `SQLite` storage.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use workout_manager::{
    config::{DatabaseUrl, ServerConfig},
    logging,
    resources::ServerResources,
    server::WorkoutServer,
};

#[derive(Parser)]
#[command(name = "workout-manager-server")]
#[command(about = "Workout Manager - fitness and nutrition tracking REST API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&url);
    }
    config.validate()?;

    logging::init_from_env()?;

    info!("Starting Workout Manager server");
    info!("{}", config.summary());

    let port = config.http_port;
    let resources = Arc::new(ServerResources::initialize(config).await?);
    info!("Database ready");

    display_available_endpoints(port);

    if let Err(e) = WorkoutServer::new(resources).run(port).await {
        error!("Server error: {e}");
        return Err(e);
    }
    Ok(())
}

/// Log the main API entry points
fn display_available_endpoints(port: u16) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());

    info!("=== Available API Endpoints ===");
    info!("Health:       GET  http://{host}:{port}/health");
    info!("Register:     POST http://{host}:{port}/api/v1/auth/register");
    info!("Login:        POST http://{host}:{port}/api/v1/auth/login");
    info!("Guest:        POST http://{host}:{port}/api/v1/auth/guest");
    info!("Workouts:     http://{host}:{port}/api/v1/workouts");
    info!("Schedules:    http://{host}:{port}/api/v1/schedules");
    info!("Nutrition:    http://{host}:{port}/api/v1/nutrition-plans");
    info!("Weight:       http://{host}:{port}/api/v1/weight");
    info!("Gyms:         http://{host}:{port}/api/v1/gyms");
    info!("Groups:       http://{host}:{port}/api/v1/groups");
    info!("=== End of Endpoint List ===");
}
