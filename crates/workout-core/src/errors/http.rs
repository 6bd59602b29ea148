// ABOUTME: axum integration for AppError
// ABOUTME: Converts errors into JSON error envelopes with the mapped HTTP status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{AppError, ErrorResponse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                error.code = ?self.code,
                error.message = %self.message,
                "Request failed with server error"
            );
        } else {
            tracing::debug!(
                error.code = ?self.code,
                error.message = %self.message,
                "Request rejected"
            );
        }

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}
