// ABOUTME: Request tracing for correlation and structured logging
// ABOUTME: Builds the per-request span carrying the request ID set by the request-id layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::constants::http::REQUEST_ID_HEADER;
use axum::http::Request;
use tower_http::trace::MakeSpan;
use tracing::Span;

/// Span factory for `TraceLayer` that tags every request with its ID
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        create_request_span(
            request.method().as_str(),
            request.uri().path(),
            request_id(request),
        )
    }
}

/// Request ID assigned by `SetRequestIdLayer`, empty when absent
fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Create a tracing span for an HTTP request
pub fn create_request_span(method: &str, path: &str, request_id: &str) -> Span {
    tracing::info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
        user_id = tracing::field::Empty,
    )
}

/// Create a tracing span for a maintenance job
pub fn create_job_span(job: &str) -> Span {
    tracing::info_span!("job", job = %job, processed = tracing::field::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_read_from_header() {
        let request = Request::builder()
            .uri("/api/v1/workouts")
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(())
            .unwrap();
        assert_eq!(request_id(&request), "abc-123");

        let bare = Request::builder().uri("/").body(()).unwrap();
        assert_eq!(request_id(&bare), "");
    }
}
