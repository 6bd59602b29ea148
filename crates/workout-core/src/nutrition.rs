// ABOUTME: Nutritional value aggregation for meal items, meals, plans and diary entries
// ABOUTME: Also validates ingredient macro consistency before ingredients are saved
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Nutrition calculations
//!
//! Ingredient values are stored per 100 g. A meal item contributes
//! `value × grams / 100`, where grams is either the raw amount or
//! `amount × unit.amount × unit.gram` when a weight unit is selected. Meals sum
//! their items and plans sum their meals. Rows that reference a missing
//! ingredient or unit contribute zero.

use crate::constants::{energy, limits};
use crate::errors::{AppError, AppResult};
use crate::models::{Ingredient, IngredientWeightUnit, MealWithItems, NutritionLogItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use uuid::Uuid;

/// Macro and micro nutrient totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionalValues {
    /// kcal
    pub energy: f64,
    /// g
    pub protein: f64,
    /// g
    pub carbohydrates: f64,
    /// g
    pub carbohydrates_sugar: f64,
    /// g
    pub fat: f64,
    /// g
    pub fat_saturated: f64,
    /// g
    pub fibre: f64,
    /// g
    pub sodium: f64,
}

impl NutritionalValues {
    /// Values contributed by `grams` of `ingredient`
    #[must_use]
    pub fn for_ingredient(ingredient: &Ingredient, grams: f64) -> Self {
        let scale = grams / 100.0;
        Self {
            energy: ingredient.energy * scale,
            protein: ingredient.protein * scale,
            carbohydrates: ingredient.carbohydrates * scale,
            carbohydrates_sugar: ingredient.carbohydrates_sugar.unwrap_or(0.0) * scale,
            fat: ingredient.fat * scale,
            fat_saturated: ingredient.fat_saturated.unwrap_or(0.0) * scale,
            fibre: ingredient.fibre.unwrap_or(0.0) * scale,
            sodium: ingredient.sodium.unwrap_or(0.0) * scale,
        }
    }

    /// Energy in kilojoule
    #[must_use]
    pub fn energy_kilojoule(&self) -> f64 {
        self.energy * energy::KJ_PER_KCAL
    }

    /// Copy with every field rounded to two decimals
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            energy: round2(self.energy),
            protein: round2(self.protein),
            carbohydrates: round2(self.carbohydrates),
            carbohydrates_sugar: round2(self.carbohydrates_sugar),
            fat: round2(self.fat),
            fat_saturated: round2(self.fat_saturated),
            fibre: round2(self.fibre),
            sodium: round2(self.sodium),
        }
    }
}

impl Add for NutritionalValues {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            energy: self.energy + other.energy,
            protein: self.protein + other.protein,
            carbohydrates: self.carbohydrates + other.carbohydrates,
            carbohydrates_sugar: self.carbohydrates_sugar + other.carbohydrates_sugar,
            fat: self.fat + other.fat,
            fat_saturated: self.fat_saturated + other.fat_saturated,
            fibre: self.fibre + other.fibre,
            sodium: self.sodium + other.sodium,
        }
    }
}

impl AddAssign for NutritionalValues {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for NutritionalValues {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weight in grams of an amount, optionally expressed in a weight unit
#[must_use]
pub fn item_weight_grams(amount: f64, unit: Option<&IngredientWeightUnit>) -> f64 {
    unit.map_or(amount, |unit| amount * unit.amount * unit.gram)
}

/// Ingredients and weight units referenced by a set of items
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    ingredients: HashMap<Uuid, Ingredient>,
    units: HashMap<Uuid, IngredientWeightUnit>,
}

impl IngredientCatalog {
    /// Build a catalog from loaded rows
    #[must_use]
    pub fn new(
        ingredients: impl IntoIterator<Item = Ingredient>,
        units: impl IntoIterator<Item = IngredientWeightUnit>,
    ) -> Self {
        Self {
            ingredients: ingredients.into_iter().map(|i| (i.id, i)).collect(),
            units: units.into_iter().map(|u| (u.id, u)).collect(),
        }
    }

    /// Look up an ingredient
    #[must_use]
    pub fn ingredient(&self, id: Uuid) -> Option<&Ingredient> {
        self.ingredients.get(&id)
    }

    /// Values of `amount` of an ingredient, zero when the ingredient is unknown
    #[must_use]
    pub fn values_for(
        &self,
        ingredient_id: Uuid,
        weight_unit_id: Option<Uuid>,
        amount: f64,
    ) -> NutritionalValues {
        let Some(ingredient) = self.ingredients.get(&ingredient_id) else {
            return NutritionalValues::default();
        };
        let unit = weight_unit_id.and_then(|id| self.units.get(&id));
        NutritionalValues::for_ingredient(ingredient, item_weight_grams(amount, unit))
    }
}

/// Share of energy from each macro nutrient, in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyPercentages {
    /// Percent of energy from protein
    pub protein: f64,
    /// Percent of energy from carbohydrates
    pub carbohydrates: f64,
    /// Percent of energy from fat
    pub fat: f64,
}

/// Grams of each macro nutrient per kilogram of body weight
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerKilogram {
    /// g protein per kg
    pub protein: f64,
    /// g carbohydrates per kg
    pub carbohydrates: f64,
    /// g fat per kg
    pub fat: f64,
}

/// Values of one meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealNutrition {
    /// Meal
    pub meal_id: Uuid,
    /// Meal name
    pub name: String,
    /// Sum over the meal's items
    pub values: NutritionalValues,
}

/// Aggregated values of a nutrition plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNutrition {
    /// Sum over all meals
    pub total: NutritionalValues,
    /// Total energy in kJ
    pub energy_kilojoule: f64,
    /// Energy distribution
    pub percent: EnergyPercentages,
    /// Per kilogram values, absent without a body weight
    pub per_kg: Option<PerKilogram>,
    /// Per meal breakdown
    pub meals: Vec<MealNutrition>,
}

/// Sum over a meal's items
#[must_use]
pub fn meal_values(catalog: &IngredientCatalog, meal: &MealWithItems) -> NutritionalValues {
    meal.items
        .iter()
        .map(|item| catalog.values_for(item.ingredient_id, item.weight_unit_id, item.amount))
        .sum()
}

/// Aggregate a plan's meals, with per-kg values when the body weight is known
#[must_use]
pub fn summarize_plan(
    catalog: &IngredientCatalog,
    meals: &[MealWithItems],
    body_weight_kg: Option<f64>,
) -> PlanNutrition {
    let meals: Vec<MealNutrition> = meals
        .iter()
        .map(|meal| MealNutrition {
            meal_id: meal.meal.id,
            name: meal.meal.name.clone(),
            values: meal_values(catalog, meal),
        })
        .collect();

    let total: NutritionalValues = meals.iter().map(|m| m.values).sum();

    PlanNutrition {
        energy_kilojoule: round2(total.energy_kilojoule()),
        percent: energy_percentages(&total),
        per_kg: body_weight_kg
            .filter(|weight| *weight > 0.0)
            .map(|weight| PerKilogram {
                protein: round2(total.protein / weight),
                carbohydrates: round2(total.carbohydrates / weight),
                fat: round2(total.fat / weight),
            }),
        total: total.rounded(),
        meals: meals
            .into_iter()
            .map(|m| MealNutrition {
                values: m.values.rounded(),
                ..m
            })
            .collect(),
    }
}

/// Energy share of protein, carbohydrates and fat
#[must_use]
pub fn energy_percentages(values: &NutritionalValues) -> EnergyPercentages {
    if values.energy <= 0.0 {
        return EnergyPercentages::default();
    }
    let share = |grams: f64, factor: f64| round2(grams * factor / values.energy * 100.0);
    EnergyPercentages {
        protein: share(values.protein, energy::KCAL_PER_G_PROTEIN),
        carbohydrates: share(values.carbohydrates, energy::KCAL_PER_G_CARBOHYDRATES),
        fat: share(values.fat, energy::KCAL_PER_G_FAT),
    }
}

/// Diary totals grouped by calendar date
#[must_use]
pub fn daily_log_totals(
    catalog: &IngredientCatalog,
    items: &[NutritionLogItem],
) -> BTreeMap<NaiveDate, NutritionalValues> {
    let mut totals: BTreeMap<NaiveDate, NutritionalValues> = BTreeMap::new();
    for item in items {
        *totals.entry(item.datetime.date_naive()).or_default() +=
            catalog.values_for(item.ingredient_id, item.weight_unit_id, item.amount);
    }
    totals
        .into_iter()
        .map(|(date, values)| (date, values.rounded()))
        .collect()
}

/// Check an ingredient's values before it is saved
///
/// The stated energy must lie within 15% of `4·protein + 4·carbs + 9·fat`,
/// sugar cannot exceed carbohydrates, saturated fat cannot exceed fat, and the
/// macro nutrients cannot weigh more than 100 g per 100 g.
///
/// # Errors
///
/// Returns a field-tagged validation error describing the first violation
pub fn validate_ingredient(ingredient: &Ingredient) -> AppResult<()> {
    if ingredient.name.trim().is_empty() {
        return Err(AppError::invalid_field("name", "Ingredient name is required"));
    }

    check_range("energy", ingredient.energy, limits::MAX_ENERGY_KCAL)?;
    check_range("protein", ingredient.protein, limits::MAX_MACRO_GRAMS)?;
    check_range("carbohydrates", ingredient.carbohydrates, limits::MAX_MACRO_GRAMS)?;
    check_range("fat", ingredient.fat, limits::MAX_MACRO_GRAMS)?;
    for (field, value) in [
        ("carbohydrates_sugar", ingredient.carbohydrates_sugar),
        ("fat_saturated", ingredient.fat_saturated),
        ("fibre", ingredient.fibre),
        ("sodium", ingredient.sodium),
    ] {
        if let Some(value) = value {
            check_range(field, value, limits::MAX_MACRO_GRAMS)?;
        }
    }

    if ingredient
        .carbohydrates_sugar
        .is_some_and(|sugar| sugar > ingredient.carbohydrates)
    {
        return Err(AppError::invalid_field(
            "carbohydrates_sugar",
            "The sugar content cannot be greater than the carbohydrates",
        ));
    }

    if ingredient
        .fat_saturated
        .is_some_and(|saturated| saturated > ingredient.fat)
    {
        return Err(AppError::invalid_field(
            "fat_saturated",
            "The saturated fat content cannot be greater than the fat",
        ));
    }

    if ingredient.protein + ingredient.carbohydrates + ingredient.fat > limits::MAX_MACRO_GRAMS {
        return Err(AppError::invalid_field(
            "protein",
            "The sum of protein, carbohydrates and fat cannot exceed 100g",
        ));
    }

    let computed = ingredient.protein * energy::KCAL_PER_G_PROTEIN
        + ingredient.carbohydrates * energy::KCAL_PER_G_CARBOHYDRATES
        + ingredient.fat * energy::KCAL_PER_G_FAT;
    let tolerance = energy::ENERGY_APPROXIMATION_PERCENT / 100.0;
    let lower = ingredient.energy * (1.0 - tolerance);
    let upper = ingredient.energy * (1.0 + tolerance);
    if computed < lower || computed > upper {
        return Err(AppError::invalid_field(
            "energy",
            format!(
                "The total energy ({}kcal) is not the approximate sum of the energy provided by \
                 protein, carbohydrates and fat ({}kcal +/-{}%)",
                ingredient.energy,
                round2(computed),
                energy::ENERGY_APPROXIMATION_PERCENT
            ),
        ));
    }

    Ok(())
}

fn check_range(field: &str, value: f64, max: f64) -> AppResult<()> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(AppError::out_of_range(field, 0.0, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::{Meal, MealItem, ModerationStatus};
    use chrono::{TimeZone, Utc};

    fn ingredient(energy: f64, protein: f64, carbohydrates: f64, fat: f64) -> Ingredient {
        Ingredient {
            id: Uuid::new_v4(),
            language_id: Uuid::new_v4(),
            name: "Test".to_owned(),
            energy,
            protein,
            carbohydrates,
            carbohydrates_sugar: None,
            fat,
            fat_saturated: None,
            fibre: None,
            sodium: None,
            status: ModerationStatus::Accepted,
            license_author: None,
            author_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn meal(items: Vec<MealItem>) -> MealWithItems {
        let meal_id = Uuid::new_v4();
        MealWithItems {
            meal: Meal {
                id: meal_id,
                plan_id: Uuid::new_v4(),
                order: 1,
                time: None,
                name: "Breakfast".to_owned(),
            },
            items: items
                .into_iter()
                .map(|item| MealItem { meal_id, ..item })
                .collect(),
        }
    }

    fn item(ingredient_id: Uuid, unit: Option<Uuid>, amount: f64) -> MealItem {
        MealItem {
            id: Uuid::new_v4(),
            meal_id: Uuid::nil(),
            ingredient_id,
            weight_unit_id: unit,
            order: 1,
            amount,
        }
    }

    #[test]
    fn test_item_weight_with_and_without_unit() {
        let unit = IngredientWeightUnit {
            id: Uuid::new_v4(),
            ingredient_id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            gram: 30.0,
            amount: 0.5,
        };
        assert!((item_weight_grams(150.0, None) - 150.0).abs() < f64::EPSILON);
        assert!((item_weight_grams(2.0, Some(&unit)) - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_plan_sums_meals_and_converts_units() {
        // 100g: 120 kcal, 10 protein, 10 carbs, 4 fat (4*10 + 4*10 + 9*4 = 116)
        let oats = ingredient(120.0, 10.0, 10.0, 4.0);
        let slice = IngredientWeightUnit {
            id: Uuid::new_v4(),
            ingredient_id: oats.id,
            unit_id: Uuid::new_v4(),
            gram: 25.0,
            amount: 1.0,
        };
        let catalog = IngredientCatalog::new([oats.clone()], [slice.clone()]);

        let breakfast = meal(vec![item(oats.id, None, 200.0)]);
        let lunch = meal(vec![item(oats.id, Some(slice.id), 4.0)]);

        let summary = summarize_plan(&catalog, &[breakfast, lunch], Some(80.0));

        assert!((summary.meals[0].values.energy - 240.0).abs() < 1e-9);
        assert!((summary.meals[1].values.energy - 120.0).abs() < 1e-9);
        assert!((summary.total.energy - 360.0).abs() < 1e-9);
        assert!((summary.total.protein - 30.0).abs() < 1e-9);
        assert!((summary.energy_kilojoule - 1506.24).abs() < 1e-9);

        let per_kg = summary.per_kg.unwrap();
        assert!((per_kg.protein - 0.38).abs() < 1e-9);

        // protein: 30g * 4 / 360 kcal
        assert!((summary.percent.protein - 33.33).abs() < 1e-9);
        assert!((summary.percent.fat - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_ingredient_contributes_zero() {
        let catalog = IngredientCatalog::default();
        let values = meal_values(&catalog, &meal(vec![item(Uuid::new_v4(), None, 100.0)]));
        assert_eq!(values, NutritionalValues::default());
    }

    #[test]
    fn test_empty_plan_has_zero_percentages() {
        let summary = summarize_plan(&IngredientCatalog::default(), &[], None);
        assert_eq!(summary.percent, EnergyPercentages::default());
        assert!(summary.per_kg.is_none());
    }

    #[test]
    fn test_daily_log_totals_group_by_date() {
        let apple = ingredient(52.0, 0.3, 14.0, 0.2);
        let catalog = IngredientCatalog::new([apple.clone()], []);
        let entry = |day: u32, amount: f64| NutritionLogItem {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            datetime: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            ingredient_id: apple.id,
            weight_unit_id: None,
            amount,
        };

        let totals = daily_log_totals(
            &catalog,
            &[entry(1, 100.0), entry(1, 50.0), entry(2, 200.0)],
        );

        assert_eq!(totals.len(), 2);
        let first = totals[&NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()];
        assert!((first.energy - 78.0).abs() < 1e-9);
    }

    #[test]
    fn test_ingredient_energy_must_match_macros() {
        assert!(validate_ingredient(&ingredient(116.0, 10.0, 10.0, 4.0)).is_ok());
        // 15% band around 116 computed: stated 101 is within (116 <= 101 * 1.15)
        assert!(validate_ingredient(&ingredient(101.0, 10.0, 10.0, 4.0)).is_ok());

        let err = validate_ingredient(&ingredient(300.0, 10.0, 10.0, 4.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.context.details["field"], "energy");
    }

    #[test]
    fn test_ingredient_sub_values_bounded_by_parents() {
        let mut sugary = ingredient(116.0, 10.0, 10.0, 4.0);
        sugary.carbohydrates_sugar = Some(11.0);
        let err = validate_ingredient(&sugary).unwrap_err();
        assert_eq!(err.context.details["field"], "carbohydrates_sugar");

        let mut fatty = ingredient(116.0, 10.0, 10.0, 4.0);
        fatty.fat_saturated = Some(5.0);
        let err = validate_ingredient(&fatty).unwrap_err();
        assert_eq!(err.context.details["field"], "fat_saturated");
    }

    #[test]
    fn test_ingredient_macros_cannot_exceed_100g() {
        let err = validate_ingredient(&ingredient(640.0, 60.0, 40.0, 20.0)).unwrap_err();
        assert_eq!(err.context.details["field"], "protein");
    }

    #[test]
    fn test_zero_ingredient_is_valid() {
        assert!(validate_ingredient(&ingredient(0.0, 0.0, 0.0, 0.0)).is_ok());
    }
}
