// ABOUTME: Exercise catalogue models
// ABOUTME: Languages, categories, muscles, equipment, exercises and comments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::ModerationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content language for exercises, ingredients and weight units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Unique identifier
    pub id: Uuid,
    /// ISO code such as `en` or `de`
    pub short_name: String,
    /// Display name
    pub full_name: String,
}

/// Exercise category such as "Arms" or "Legs"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseCategory {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
}

/// Muscle targeted by exercises
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Muscle {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Shown on the front body view
    pub is_front: bool,
}

/// Training equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
}

/// Catalogue exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Free text description
    pub description: String,
    /// Category
    pub category_id: Uuid,
    /// Language of name and description
    pub language_id: Uuid,
    /// Primary muscles
    pub muscles: Vec<Uuid>,
    /// Secondary muscles
    pub muscles_secondary: Vec<Uuid>,
    /// Required equipment
    pub equipment: Vec<Uuid>,
    /// Review state
    pub status: ModerationStatus,
    /// Attribution for the content license
    pub license_author: Option<String>,
    /// Submitting user
    pub author_id: Option<Uuid>,
    /// Submission time
    pub created_at: DateTime<Utc>,
}

/// Short hint attached to an exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseComment {
    /// Unique identifier
    pub id: Uuid,
    /// Commented exercise
    pub exercise_id: Uuid,
    /// Comment text
    pub comment: String,
}
