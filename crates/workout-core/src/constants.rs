// ABOUTME: Application constants for validation limits, defaults, and conversion factors
// ABOUTME: Shared by model validation, calculators, and the database layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

/// Bounds enforced when entities are saved
pub mod limits {
    /// Sleep, work and free time together may not exceed one day
    pub const MAX_HOURS_PER_DAY: f64 = 24.0;
    /// Youngest accepted profile age
    pub const MIN_AGE: u32 = 10;
    /// Oldest accepted profile age
    pub const MAX_AGE: u32 = 100;
    /// Shortest accepted body height in centimeters
    pub const MIN_HEIGHT_CM: f64 = 140.0;
    /// Tallest accepted body height in centimeters
    pub const MAX_HEIGHT_CM: f64 = 230.0;
    /// Sport hours are recorded per week
    pub const MAX_SPORT_HOURS_PER_WEEK: f64 = 30.0;
    /// Lowest accepted body weight entry
    pub const MIN_BODY_WEIGHT: f64 = 30.0;
    /// Highest accepted body weight entry
    pub const MAX_BODY_WEIGHT: f64 = 600.0;
    /// Minimum number of sets in a set group
    pub const MIN_SETS: u32 = 1;
    /// Maximum number of sets in a set group
    pub const MAX_SETS: u32 = 10;
    /// Maximum repetitions in a setting
    pub const MAX_REPS: u32 = 600;
    /// Repetition value meaning "until failure"
    pub const REPS_TO_FAILURE: u32 = 99;
    /// Maximum reps in reserve
    pub const MAX_RIR: f64 = 10.0;
    /// Largest meal item amount
    pub const MAX_MEAL_ITEM_AMOUNT: f64 = 1000.0;
    /// Shortest schedule step in weeks
    pub const MIN_STEP_WEEKS: u32 = 1;
    /// Longest schedule step in weeks
    pub const MAX_STEP_WEEKS: u32 = 25;
    /// Per 100g upper bound for macro nutrients
    pub const MAX_MACRO_GRAMS: f64 = 100.0;
    /// Per 100g upper bound for energy in kcal
    pub const MAX_ENERGY_KCAL: f64 = 1000.0;
    /// Maximum length of short names (workouts, plans, groups)
    pub const MAX_NAME_LENGTH: usize = 100;
}

/// Default values for newly created rows
pub mod defaults {
    /// Days before the end of a workout when a reminder is sent
    pub const WORKOUT_REMINDER_DAYS: u32 = 14;
    /// Default lifetime of a workout without a schedule, in weeks
    pub const WORKOUT_DURATION_WEEKS: u32 = 12;
    /// Default sleep hours per day
    pub const SLEEP_HOURS: f64 = 7.0;
    /// Default work hours per day
    pub const WORK_HOURS: f64 = 8.0;
    /// Default sport hours per week
    pub const SPORT_HOURS: f64 = 3.0;
    /// Default free time hours per day
    pub const FREETIME_HOURS: f64 = 8.0;
    /// Default daily calorie target
    pub const CALORIES: f64 = 2500.0;
    /// Default number of sets in a new set group
    pub const SETS: u32 = 4;
    /// Weeks without training before a gym member counts as inactive
    pub const GYM_WEEKS_INACTIVE: u32 = 4;
    /// Age in days after which guest accounts are removed
    pub const TEMP_USER_MAX_AGE_DAYS: i64 = 7;
    /// Multiplier for ingredient weight units
    pub const WEIGHT_UNIT_AMOUNT: f64 = 1.0;
}

/// Energy conversion factors
pub mod energy {
    /// kcal per gram of protein
    pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
    /// kcal per gram of carbohydrates
    pub const KCAL_PER_G_CARBOHYDRATES: f64 = 4.0;
    /// kcal per gram of fat
    pub const KCAL_PER_G_FAT: f64 = 9.0;
    /// kJ per kcal
    pub const KJ_PER_KCAL: f64 = 4.184;
    /// Allowed deviation between stated and computed ingredient energy, in percent
    pub const ENERGY_APPROXIMATION_PERCENT: f64 = 15.0;
}

/// Unit conversion
pub mod units {
    /// Kilograms per pound
    pub const KG_PER_LB: f64 = 0.453_592_37;
}

/// Reminder job settings
pub mod reminders {
    /// Minimum days between two workout reminders for the same user
    pub const NOTIFICATION_COOLDOWN_DAYS: i64 = 7;
}
