// ABOUTME: Domain model definitions for the workout manager
// ABOUTME: Re-exports users, exercises, workouts, schedules, nutrition, weight, gyms and groups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Domain models
//!
//! These structs mirror database rows one to one. Request payloads live next
//! to the database managers that consume them.

mod exercise;
mod group;
mod gym;
mod nutrition;
mod profile;
mod schedule;
mod user;
mod weight;
mod workout;

pub use exercise::{Equipment, Exercise, ExerciseCategory, ExerciseComment, Language, Muscle};
pub use group::{Group, GroupApplication, Membership};
pub use gym::{
    AdminUserNote, Contract, ContractOption, ContractType, Gym, GymAdminConfig, GymConfig,
    GymUserConfig, PaymentInterval,
};
pub use nutrition::{
    Ingredient, IngredientWeightUnit, Meal, MealItem, MealWithItems, NutritionLogItem,
    NutritionPlan, WeightUnit,
};
pub use profile::{Gender, Intensity, MassUnit, UserProfile};
pub use schedule::{Schedule, ScheduleStep};
pub use user::User;
pub use weight::WeightEntry;
pub use workout::{
    Day, DayOfWeek, ExerciseSet, Impression, Setting, Workout, WorkoutLog, WorkoutSession,
};

use serde::{Deserialize, Serialize};

/// Review state for user submitted exercises and ingredients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    /// Waiting for review
    #[default]
    Pending,
    /// Visible to everybody
    Accepted,
    /// Rejected by a moderator
    Declined,
}

impl ModerationStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            _ => Self::Pending,
        }
    }
}
