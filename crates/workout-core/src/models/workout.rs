// ABOUTME: Workout routine and training log models
// ABOUTME: Workout, Day, ExerciseSet, Setting, WorkoutLog and WorkoutSession
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Training routine owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// Creation date, drives the reminder window when no schedule is active
    pub created: NaiveDate,
}

/// Weekday a training day is performed on, Monday = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DayOfWeek {
    /// 1
    Monday = 1,
    /// 2
    Tuesday = 2,
    /// 3
    Wednesday = 3,
    /// 4
    Thursday = 4,
    /// 5
    Friday = 5,
    /// 6
    Saturday = 6,
    /// 7
    Sunday = 7,
}

impl DayOfWeek {
    /// English day name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// ISO weekday number
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Weekday of a calendar date
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        use chrono::Datelike;
        match date.weekday() {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Monday),
            2 => Ok(Self::Tuesday),
            3 => Ok(Self::Wednesday),
            4 => Ok(Self::Thursday),
            5 => Ok(Self::Friday),
            6 => Ok(Self::Saturday),
            7 => Ok(Self::Sunday),
            other => Err(format!("day of week must be between 1 and 7, got {other}")),
        }
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.number()
    }
}

/// Training day within a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    /// Unique identifier
    pub id: Uuid,
    /// Parent workout
    pub workout_id: Uuid,
    /// Description such as "Upper body"
    pub description: String,
    /// Weekdays this day is trained on
    pub days_of_week: Vec<DayOfWeek>,
}

/// Group of exercises performed for the same number of sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSet {
    /// Unique identifier
    pub id: Uuid,
    /// Parent day
    pub day_id: Uuid,
    /// Position within the day
    pub order: u32,
    /// Number of sets
    pub sets: u32,
    /// Exercises in execution order, more than one forms a superset
    pub exercises: Vec<Uuid>,
}

/// Repetition target for one exercise in a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Unique identifier
    pub id: Uuid,
    /// Parent set
    pub set_id: Uuid,
    /// Exercise, must be part of the set
    pub exercise_id: Uuid,
    /// Target repetitions, 99 means until failure
    pub reps: u32,
    /// Target weight in the owner's unit
    pub weight: Option<f64>,
    /// Reps in reserve
    pub rir: Option<f64>,
    /// Position for this exercise within the set
    pub order: u32,
    /// Free text hint
    pub comment: String,
}

/// Performed repetitions for one exercise on a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Workout trained
    pub workout_id: Uuid,
    /// Exercise performed
    pub exercise_id: Uuid,
    /// Repetitions performed
    pub reps: u32,
    /// Weight lifted
    pub weight: f64,
    /// Reps in reserve
    pub rir: Option<f64>,
    /// Training date
    pub date: NaiveDate,
}

/// Subjective rating of a training session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Impression {
    /// Bad session
    Bad,
    /// Neutral session
    #[default]
    Neutral,
    /// Good session
    Good,
}

impl Impression {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bad => "bad",
            Self::Neutral => "neutral",
            Self::Good => "good",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "bad" => Self::Bad,
            "good" => Self::Good,
            _ => Self::Neutral,
        }
    }
}

/// Per-day training session record, unique per user and date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSession {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Workout trained
    pub workout_id: Uuid,
    /// Session date
    pub date: NaiveDate,
    /// Free text notes
    pub notes: String,
    /// Subjective rating
    pub impression: Impression,
    /// Start time
    pub time_start: Option<NaiveTime>,
    /// End time
    pub time_end: Option<NaiveTime>,
}
