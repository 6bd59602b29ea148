// ABOUTME: Core types and pure calculations for the workout manager
// ABOUTME: Foundation crate with error handling, domain models, nutrition and schedule math
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

#![deny(unsafe_code)]

//! # Workout Core
//!
//! Foundation crate for the workout manager. Nothing in here touches the
//! network or the database: every function operates on rows that were
//! already loaded, which keeps the arithmetic easy to unit test.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Validation limits, defaults, and energy factors
//! - **models**: Domain entities (workouts, nutrition plans, gyms, groups)
//! - **nutrition**: Nutritional value aggregation and ingredient checks
//! - **body_stats**: BMI, BMR, activity factor and profile validation
//! - **scheduling**: Current scheduled workout resolution
//! - **routine**: Canonical workout representation and repetition text
//! - **gym**: Member inactivity and contract validation
//! - **groups**: Group membership workflow decisions
//! - **reminders**: Workout and weight reminder selection
//! - **permissions**: Role bitflags and data access policy

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Domain models shared by the database and HTTP layers
pub mod models;

/// Nutritional value aggregation across meals and plans
pub mod nutrition;

/// Body statistics derived from the user profile
pub mod body_stats;

/// Date-windowed schedule step resolution
pub mod scheduling;

/// Canonical workout representation
pub mod routine;

/// Gym membership rules
pub mod gym;

/// Group membership workflow
pub mod groups;

/// Reminder selection for maintenance jobs
pub mod reminders;

/// Role-based permission system with bitflags
pub mod permissions;
