// ABOUTME: Nutrition plan and ingredient models
// ABOUTME: NutritionPlan, Meal, MealItem, Ingredient, weight units and diary entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::ModerationStatus;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Nutrition plan owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionPlan {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Description
    pub description: String,
    /// Creation date
    pub created: NaiveDate,
    /// Compare totals against the profile calorie target
    pub has_goal_calories: bool,
}

/// Meal within a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    /// Unique identifier
    pub id: Uuid,
    /// Parent plan
    pub plan_id: Uuid,
    /// Position within the plan
    pub order: u32,
    /// Time of day
    pub time: Option<NaiveTime>,
    /// Display name such as "Breakfast"
    pub name: String,
}

/// Ingredient amount within a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    /// Unique identifier
    pub id: Uuid,
    /// Parent meal
    pub meal_id: Uuid,
    /// Ingredient
    pub ingredient_id: Uuid,
    /// Unit the amount is expressed in, grams when absent
    pub weight_unit_id: Option<Uuid>,
    /// Position within the meal
    pub order: u32,
    /// Amount in grams or in units
    pub amount: f64,
}

/// A meal together with its items, as loaded for aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealWithItems {
    /// Meal row
    pub meal: Meal,
    /// Items ordered by position
    pub items: Vec<MealItem>,
}

/// Food with nutritional values per 100 g
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique identifier
    pub id: Uuid,
    /// Language of the name
    pub language_id: Uuid,
    /// Display name
    pub name: String,
    /// Energy in kcal
    pub energy: f64,
    /// Protein in g
    pub protein: f64,
    /// Carbohydrates in g
    pub carbohydrates: f64,
    /// Sugar in g, part of carbohydrates
    pub carbohydrates_sugar: Option<f64>,
    /// Fat in g
    pub fat: f64,
    /// Saturated fat in g, part of fat
    pub fat_saturated: Option<f64>,
    /// Fibre in g
    pub fibre: Option<f64>,
    /// Sodium in g
    pub sodium: Option<f64>,
    /// Review state
    pub status: ModerationStatus,
    /// Attribution for the content license
    pub license_author: Option<String>,
    /// Submitting user
    pub author_id: Option<Uuid>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update
    pub updated_at: DateTime<Utc>,
}

/// Named portion such as "Slice" or "Cup"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightUnit {
    /// Unique identifier
    pub id: Uuid,
    /// Language of the name
    pub language_id: Uuid,
    /// Display name
    pub name: String,
}

/// Gram equivalent of a weight unit for one ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientWeightUnit {
    /// Unique identifier
    pub id: Uuid,
    /// Ingredient
    pub ingredient_id: Uuid,
    /// Weight unit
    pub unit_id: Uuid,
    /// Grams per unit
    pub gram: f64,
    /// Multiplier, e.g. 0.5 for "half a cup"
    pub amount: f64,
}

/// Diary entry of food actually eaten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionLogItem {
    /// Unique identifier
    pub id: Uuid,
    /// Plan the entry is logged against
    pub plan_id: Uuid,
    /// When it was eaten
    pub datetime: DateTime<Utc>,
    /// Ingredient
    pub ingredient_id: Uuid,
    /// Unit the amount is expressed in, grams when absent
    pub weight_unit_id: Option<Uuid>,
    /// Amount in grams or in units
    pub amount: f64,
}
