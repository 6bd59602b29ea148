// ABOUTME: Body weight entry model
// ABOUTME: One measurement per user and date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body weight measurement, unique per (user, date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Measurement date
    pub date: NaiveDate,
    /// Weight in the owner's unit
    pub weight: f64,
}
