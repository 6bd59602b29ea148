// ABOUTME: Training schedule models
// ABOUTME: Schedule and its ordered ScheduleStep rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sequence of workouts rotated over time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// First day of the first step
    pub start_date: NaiveDate,
    /// Only one schedule per user is active
    pub is_active: bool,
    /// Restart from the first step after the last one ends
    pub is_loop: bool,
}

/// One workout in a schedule, lasting `duration` weeks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStep {
    /// Unique identifier
    pub id: Uuid,
    /// Parent schedule
    pub schedule_id: Uuid,
    /// Workout trained during this step
    pub workout_id: Uuid,
    /// Length in weeks
    pub duration: u32,
    /// Position within the schedule
    pub order: u32,
}
