// ABOUTME: Error types for the workout manager server
// ABOUTME: Re-exports the unified AppError from workout-core and adds sqlx conversions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! # Unified Error Handling
//!
//! `AppError` and its HTTP rendering live in `workout_core::errors`. This
//! module re-exports them and adds the conversions that need the database
//! driver.

pub use workout_core::errors::{
    AppError, AppResult, ErrorCode, ErrorContext, ErrorResponse, ErrorResponseDetails,
};

/// Map a sqlx error, turning unique constraint violations into
/// `ResourceAlreadyExists` with the given message
#[must_use]
pub fn map_unique_violation(err: sqlx::Error, exists_message: &str, context: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::already_exists(exists_message);
        }
    }
    AppError::database(format!("{context}: {err}"))
}

/// Map a foreign key violation to `ResourceConflict`, anything else to a database error
#[must_use]
pub fn map_reference_violation(err: sqlx::Error, in_use_message: &str, context: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return AppError::conflict(in_use_message);
        }
    }
    AppError::database(format!("{context}: {err}"))
}
