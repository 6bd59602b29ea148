// ABOUTME: Body statistics derived from the user profile and latest weight entry
// ABOUTME: BMI, Mifflin-St Jeor BMR, activity calorie factor and profile validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Body statistics
//!
//! ## Formulas
//!
//! - **BMI**: `weight_kg / (height_m)²`
//! - **BMR** (Mifflin-St Jeor): `10·kg + 6.25·cm − 5·age + 5` for men and
//!   `− 161` instead of `+ 5` for women
//! - **Activity factor**: hours of each activity bucket weighted by intensity,
//!   averaged over 24 hours. Sport hours are recorded per week and spread
//!   evenly over seven days.

use crate::constants::{limits, units};
use crate::errors::{AppError, AppResult};
use crate::models::{Gender, MassUnit, UserProfile};
use serde::{Deserialize, Serialize};

/// Mifflin-St Jeor weight coefficient
const BMR_WEIGHT_COEF: f64 = 10.0;
/// Mifflin-St Jeor height coefficient
const BMR_HEIGHT_COEF: f64 = 6.25;
/// Mifflin-St Jeor age coefficient
const BMR_AGE_COEF: f64 = 5.0;
/// Mifflin-St Jeor offset for men
const BMR_MALE_OFFSET: f64 = 5.0;
/// Mifflin-St Jeor offset for women
const BMR_FEMALE_OFFSET: f64 = -161.0;
/// Energy multiplier for sleep hours
const SLEEP_FACTOR: f64 = 0.9;

/// Convert a weight in `unit` to kilograms
#[must_use]
pub fn to_kilograms(weight: f64, unit: MassUnit) -> f64 {
    match unit {
        MassUnit::Kg => weight,
        MassUnit::Lb => weight * units::KG_PER_LB,
    }
}

/// Convert a weight in kilograms to `unit`
#[must_use]
pub fn from_kilograms(weight_kg: f64, unit: MassUnit) -> f64 {
    match unit {
        MassUnit::Kg => weight_kg,
        MassUnit::Lb => weight_kg / units::KG_PER_LB,
    }
}

/// Body mass index, `None` for a non-positive height
#[must_use]
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some(weight_kg / (height_m * height_m))
}

/// WHO BMI classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    /// Below 18.5
    Underweight,
    /// 18.5 to below 25
    Normal,
    /// 25 to below 30
    Overweight,
    /// 30 and above
    Obese,
}

impl BmiCategory {
    /// Classify a BMI value
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

/// Basal metabolic rate in kcal per day
#[must_use]
pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let offset = match gender {
        Gender::Male => BMR_MALE_OFFSET,
        Gender::Female => BMR_FEMALE_OFFSET,
    };
    BMR_WEIGHT_COEF.mul_add(
        weight_kg,
        BMR_HEIGHT_COEF.mul_add(height_cm, -BMR_AGE_COEF * f64::from(age)),
    ) + offset
}

/// Activity calorie factor, rounded to two decimals
#[must_use]
pub fn activity_factor(profile: &UserProfile) -> f64 {
    let weighted = profile.sleep_hours * SLEEP_FACTOR
        + profile.work_hours * profile.work_intensity.work_factor()
        + (profile.sport_hours / 7.0) * profile.sport_intensity.sport_factor()
        + profile.freetime_hours * profile.freetime_intensity.freetime_factor();
    (weighted / 24.0 * 100.0).round() / 100.0
}

/// Statistics reported by the profile calculations endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyStatistics {
    /// Latest body weight in kilograms
    pub weight_kg: Option<f64>,
    /// Body mass index
    pub bmi: Option<f64>,
    /// BMI classification
    pub bmi_category: Option<BmiCategory>,
    /// Basal metabolic rate in kcal
    pub bmr: Option<f64>,
    /// Activity calorie factor
    pub activity_factor: f64,
    /// BMR multiplied by the activity factor
    pub daily_calories: Option<f64>,
}

/// Derive all statistics available for a profile and latest weight
///
/// `latest_weight` is expressed in the profile's weight unit. Values that
/// need missing profile fields are reported as `None`.
#[must_use]
pub fn calculate(profile: &UserProfile, latest_weight: Option<f64>) -> BodyStatistics {
    let weight_kg = latest_weight.map(|w| to_kilograms(w, profile.weight_unit));
    let factor = activity_factor(profile);

    let bmi_value = weight_kg
        .zip(profile.height)
        .and_then(|(weight, height)| bmi(weight, height))
        .map(round1);

    let bmr_value = match (weight_kg, profile.height, profile.age, profile.gender) {
        (Some(weight), Some(height), Some(age), Some(gender)) => {
            Some(bmr(weight, height, age, gender).round())
        }
        _ => None,
    };

    BodyStatistics {
        weight_kg: weight_kg.map(round1),
        bmi: bmi_value,
        bmi_category: bmi_value.map(BmiCategory::from_bmi),
        bmr: bmr_value,
        activity_factor: factor,
        daily_calories: bmr_value.map(|b| (b * factor).round()),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Check profile invariants before saving
///
/// # Errors
///
/// Returns a field-tagged validation error when an hour bucket, the age, the
/// height or the daily hour sum is out of range
pub fn validate_profile(profile: &UserProfile) -> AppResult<()> {
    for (field, hours) in [
        ("sleep_hours", profile.sleep_hours),
        ("work_hours", profile.work_hours),
        ("freetime_hours", profile.freetime_hours),
    ] {
        if !(0.0..=limits::MAX_HOURS_PER_DAY).contains(&hours) {
            return Err(AppError::out_of_range(
                field,
                0.0,
                limits::MAX_HOURS_PER_DAY,
            ));
        }
    }

    if !(0.0..=limits::MAX_SPORT_HOURS_PER_WEEK).contains(&profile.sport_hours) {
        return Err(AppError::out_of_range(
            "sport_hours",
            0.0,
            limits::MAX_SPORT_HOURS_PER_WEEK,
        ));
    }

    if profile.sleep_hours + profile.work_hours + profile.freetime_hours > limits::MAX_HOURS_PER_DAY
    {
        return Err(AppError::invalid_field(
            "sleep_hours",
            "The sum of sleep, work and free time hours cannot exceed 24",
        ));
    }

    if let Some(age) = profile.age {
        if !(limits::MIN_AGE..=limits::MAX_AGE).contains(&age) {
            return Err(AppError::out_of_range(
                "age",
                f64::from(limits::MIN_AGE),
                f64::from(limits::MAX_AGE),
            ));
        }
    }

    if let Some(height) = profile.height {
        if !(limits::MIN_HEIGHT_CM..=limits::MAX_HEIGHT_CM).contains(&height) {
            return Err(AppError::out_of_range(
                "height",
                limits::MIN_HEIGHT_CM,
                limits::MAX_HEIGHT_CM,
            ));
        }
    }

    if profile.calories < 0.0 {
        return Err(AppError::invalid_field("calories", "Calories cannot be negative"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::Intensity;
    use uuid::Uuid;

    fn profile() -> UserProfile {
        UserProfile::with_defaults(Uuid::new_v4())
    }

    #[test]
    fn test_bmi() {
        let value = bmi(80.0, 180.0).unwrap();
        assert!((value - 24.691_358).abs() < 1e-5);
        assert!(bmi(80.0, 0.0).is_none());
        assert_eq!(BmiCategory::from_bmi(value), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(31.0), BmiCategory::Obese);
    }

    #[test]
    fn test_bmr_mifflin_st_jeor() {
        // 10*80 + 6.25*180 - 5*30 + 5 = 1780
        assert!((bmr(80.0, 180.0, 30, Gender::Male) - 1780.0).abs() < 1e-9);
        // 10*60 + 6.25*165 - 5*25 - 161 = 1345.25
        assert!((bmr(60.0, 165.0, 25, Gender::Female) - 1345.25).abs() < 1e-9);
    }

    #[test]
    fn test_activity_factor_defaults() {
        // 7*0.9 + 8*1.5 + (3/7)*6 + 8*1.3 = 31.271... / 24 = 1.303
        assert!((activity_factor(&profile()) - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_activity_factor_high_intensity() {
        let mut p = profile();
        p.work_intensity = Intensity::High;
        p.sport_intensity = Intensity::High;
        p.sport_hours = 7.0;
        p.freetime_intensity = Intensity::High;
        // 6.3 + 17.6 + 10 + 19.2 = 53.1 / 24 = 2.2125
        assert!((activity_factor(&p) - 2.21).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_with_pounds() {
        let mut p = profile();
        p.weight_unit = MassUnit::Lb;
        p.height = Some(180.0);
        p.age = Some(30);
        p.gender = Some(Gender::Male);

        let stats = calculate(&p, Some(176.369_810));
        assert!((stats.weight_kg.unwrap() - 80.0).abs() < 1e-9);
        assert!((stats.bmi.unwrap() - 24.7).abs() < 1e-9);
        assert!((stats.bmr.unwrap() - 1780.0).abs() < 1e-9);
        assert!((stats.daily_calories.unwrap() - 2314.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_without_weight() {
        let stats = calculate(&profile(), None);
        assert!(stats.bmi.is_none());
        assert!(stats.bmr.is_none());
        assert!(stats.daily_calories.is_none());
        assert!(stats.activity_factor > 0.0);
    }

    #[test]
    fn test_unit_conversion_round_trip() {
        let lb = from_kilograms(100.0, MassUnit::Lb);
        assert!((to_kilograms(lb, MassUnit::Lb) - 100.0).abs() < 1e-9);
        assert!((to_kilograms(70.0, MassUnit::Kg) - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hours_cannot_exceed_a_day() {
        let mut p = profile();
        p.sleep_hours = 9.0;
        p.work_hours = 10.0;
        p.freetime_hours = 6.0;
        let err = validate_profile(&p).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        p.freetime_hours = 5.0;
        assert!(validate_profile(&p).is_ok());
    }

    #[test]
    fn test_age_and_height_limits() {
        let mut p = profile();
        p.age = Some(5);
        assert_eq!(
            validate_profile(&p).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );

        p.age = Some(40);
        p.height = Some(250.0);
        assert_eq!(
            validate_profile(&p).unwrap_err().context.details["field"],
            "height"
        );
    }
}
