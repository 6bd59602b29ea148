// ABOUTME: Liveness and readiness endpoints for load balancers and orchestrators
// ABOUTME: Readiness pings the database, liveness only reports the process is up
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::resources::ServerResources;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Health check response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `unavailable`
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
}

/// Health check routes
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health() -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        })
    }

    async fn handle_ready(State(resources): State<Arc<ServerResources>>) -> Response {
        match resources.database.ping().await {
            Ok(()) => (
                StatusCode::OK,
                Json(HealthResponse {
                    status: "ok",
                    version: env!("CARGO_PKG_VERSION"),
                }),
            )
                .into_response(),
            Err(e) => {
                tracing::warn!(error = %e, "Readiness check failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(HealthResponse {
                        status: "unavailable",
                        version: env!("CARGO_PKG_VERSION"),
                    }),
                )
                    .into_response()
            }
        }
    }
}
