// ABOUTME: HTTP middleware for authentication, CORS and request tracing
// ABOUTME: Bearer token validation plus the span factory used by the trace layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

/// Bearer token authentication
pub mod auth;
/// CORS layer configuration
pub mod cors;
/// Request spans
pub mod tracing;

pub use auth::AuthMiddleware;
pub use cors::setup_cors;
pub use self::tracing::{create_job_span, create_request_span, RequestSpan};
