// ABOUTME: User profile model with physical statistics and preferences
// ABOUTME: Carries the inputs for BMI, BMR and activity-based calorie calculations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::constants::defaults;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Biological sex used by the BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

impl Gender {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

/// Physical intensity of an activity bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    /// Light effort
    #[default]
    Low,
    /// Moderate effort
    Medium,
    /// Hard effort
    High,
}

impl Intensity {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Low,
        }
    }

    /// Energy multiplier for working hours
    #[must_use]
    pub const fn work_factor(&self) -> f64 {
        match self {
            Self::Low => 1.5,
            Self::Medium => 1.8,
            Self::High => 2.2,
        }
    }

    /// Energy multiplier for sport hours
    #[must_use]
    pub const fn sport_factor(&self) -> f64 {
        match self {
            Self::Low => 4.0,
            Self::Medium => 6.0,
            Self::High => 10.0,
        }
    }

    /// Energy multiplier for free time hours
    #[must_use]
    pub const fn freetime_factor(&self) -> f64 {
        match self {
            Self::Low => 1.3,
            Self::Medium => 1.9,
            Self::High => 2.4,
        }
    }
}

/// Unit in which the user records body and lifting weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MassUnit {
    /// Kilograms
    #[default]
    Kg,
    /// Pounds
    Lb,
}

impl MassUnit {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lb => "lb",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "lb" => Self::Lb,
            _ => Self::Kg,
        }
    }
}

/// Per-user profile, one row per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning user
    pub user_id: Uuid,
    /// Gym the user belongs to
    pub gym_id: Option<Uuid>,
    /// Guest account created without credentials
    pub is_temporary: bool,
    /// Show exercise comments in workout views
    pub show_comments: bool,
    /// Send reminders when the current workout runs out
    pub workout_reminder_active: bool,
    /// Days before the workout end to remind
    pub workout_reminder: u32,
    /// Weeks a workout lasts when no schedule is active
    pub workout_duration: u32,
    /// Date of the last workout reminder
    pub last_workout_notification: Option<NaiveDate>,
    /// Age in years
    pub age: Option<u32>,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Biological sex
    pub gender: Option<Gender>,
    /// Sleep hours per day
    pub sleep_hours: f64,
    /// Work hours per day
    pub work_hours: f64,
    /// Work intensity
    pub work_intensity: Intensity,
    /// Sport hours per week
    pub sport_hours: f64,
    /// Sport intensity
    pub sport_intensity: Intensity,
    /// Free time hours per day
    pub freetime_hours: f64,
    /// Free time intensity
    pub freetime_intensity: Intensity,
    /// Daily calorie target
    pub calories: f64,
    /// Preferred weight unit
    pub weight_unit: MassUnit,
    /// Allow other users read-only access to this user's data
    pub ro_access: bool,
    /// Remind to log body weight after this many days, zero disables
    pub num_days_weight_reminder: u32,
}

impl UserProfile {
    /// Profile with application defaults for a new user
    #[must_use]
    pub const fn with_defaults(user_id: Uuid) -> Self {
        Self {
            user_id,
            gym_id: None,
            is_temporary: false,
            show_comments: true,
            workout_reminder_active: true,
            workout_reminder: defaults::WORKOUT_REMINDER_DAYS,
            workout_duration: defaults::WORKOUT_DURATION_WEEKS,
            last_workout_notification: None,
            age: None,
            height: None,
            gender: None,
            sleep_hours: defaults::SLEEP_HOURS,
            work_hours: defaults::WORK_HOURS,
            work_intensity: Intensity::Low,
            sport_hours: defaults::SPORT_HOURS,
            sport_intensity: Intensity::Medium,
            freetime_hours: defaults::FREETIME_HOURS,
            freetime_intensity: Intensity::Low,
            calories: defaults::CALORIES,
            weight_unit: MassUnit::Kg,
            ro_access: false,
            num_days_weight_reminder: 0,
        }
    }
}
