// ABOUTME: HTTP server assembly and lifecycle for the workout manager REST API
// ABOUTME: Merges the route groups, applies the tower middleware stack and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::constants::http::{
    MAX_BODY_BYTES, REQUEST_ID_HEADER, REQUEST_TIMEOUT_SECS, ROBOTS_HEADER, ROBOTS_VALUE,
};
use crate::middleware::{setup_cors, RequestSpan};
use crate::resources::ServerResources;
use crate::routes::{
    AuthRoutes, ExerciseRoutes, GroupRoutes, GymRoutes, HealthRoutes, IngredientRoutes,
    NutritionRoutes, ProfileRoutes, ScheduleRoutes, WeightRoutes, WorkoutLogRoutes, WorkoutRoutes,
};
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use http::{HeaderName, HeaderValue};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// Owns the shared resources and runs the HTTP API
pub struct WorkoutServer {
    resources: Arc<ServerResources>,
}

impl WorkoutServer {
    /// Create a server over initialized resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the complete application router with all middleware layers
    ///
    /// Integration tests drive this router directly with `oneshot`.
    pub fn router(resources: Arc<ServerResources>) -> Router {
        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
        let cors = setup_cors(&resources.config);

        let api = Router::new()
            .merge(HealthRoutes::routes(Arc::clone(&resources)))
            .merge(AuthRoutes::routes(Arc::clone(&resources)))
            .merge(ProfileRoutes::routes(Arc::clone(&resources)))
            .merge(ExerciseRoutes::routes(Arc::clone(&resources)))
            .merge(WorkoutRoutes::routes(Arc::clone(&resources)))
            .merge(WorkoutLogRoutes::routes(Arc::clone(&resources)))
            .merge(ScheduleRoutes::routes(Arc::clone(&resources)))
            .merge(IngredientRoutes::routes(Arc::clone(&resources)))
            .merge(NutritionRoutes::routes(Arc::clone(&resources)))
            .merge(WeightRoutes::routes(Arc::clone(&resources)))
            .merge(GymRoutes::routes(Arc::clone(&resources)))
            .merge(GroupRoutes::routes(resources));

        // Outermost first: the request ID must exist before the trace span is made
        api.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(RequestSpan)
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static(ROBOTS_HEADER),
                    HeaderValue::from_static(ROBOTS_VALUE),
                ))
                .layer(cors)
                .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS))),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    }

    /// Serve the API on `port` until Ctrl-C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the server fails
    pub async fn run(self, port: u16) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP port {port}"))?;
        info!("HTTP API listening on {addr}");

        let app = Self::router(self.resources);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        info!("HTTP API stopped");
        Ok(())
    }
}

/// Resolve when the process is asked to stop
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
