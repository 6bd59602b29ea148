// ABOUTME: Canonical workout representation assembled from days, sets and settings
// ABOUTME: Produces repetition "smart text", muscle summaries and validates session times
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Day, DayOfWeek, Exercise, ExerciseSet, MassUnit, Muscle, Setting, Workout,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Human readable repetition scheme for one exercise of a set
///
/// A single setting reads `4 × 10`, several settings list their repetitions
/// as `10 – 8 – 6`. A repetition value of 99 is shown as `∞`, and weights are
/// appended in parentheses.
#[must_use]
pub fn reps_smart_text(sets: u32, settings: &[&Setting], unit: MassUnit) -> String {
    let render = |setting: &Setting| {
        let reps = if setting.reps == limits::REPS_TO_FAILURE {
            "∞".to_owned()
        } else {
            setting.reps.to_string()
        };
        match setting.weight {
            Some(weight) => format!("{reps} ({} {})", format_weight(weight), unit.as_str()),
            None => reps,
        }
    };

    match settings {
        [] => String::new(),
        [single] => format!("{sets} × {}", render(*single)),
        many => many
            .iter()
            .copied()
            .map(&render)
            .collect::<Vec<_>>()
            .join(" – "),
    }
}

fn format_weight(weight: f64) -> String {
    if (weight - weight.round()).abs() < f64::EPSILON {
        format!("{weight:.0}")
    } else {
        format!("{weight}")
    }
}

/// Loaded rows of one workout
#[derive(Debug, Clone, Default)]
pub struct WorkoutComponents {
    /// Days in creation order
    pub days: Vec<Day>,
    /// Sets of all days
    pub sets: Vec<ExerciseSet>,
    /// Settings of all sets
    pub settings: Vec<Setting>,
    /// Exercises referenced by the sets
    pub exercises: HashMap<Uuid, Exercise>,
    /// Muscles referenced by the exercises
    pub muscles: HashMap<Uuid, Muscle>,
}

/// Exercise entry inside a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalExercise {
    /// Exercise
    pub exercise_id: Uuid,
    /// Exercise name, empty when the exercise was deleted
    pub name: String,
    /// Settings in order
    pub settings: Vec<Setting>,
    /// Repetition text
    pub reps_text: String,
}

/// Set with its exercises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSet {
    /// Set row
    pub set: ExerciseSet,
    /// Exercises in order, more than one marks a superset
    pub exercises: Vec<CanonicalExercise>,
    /// Whether the set is a superset
    pub is_superset: bool,
}

/// Muscles trained on a day split by body side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuscleSummary {
    /// Primary muscles on the front
    pub front: Vec<String>,
    /// Primary muscles on the back
    pub back: Vec<String>,
    /// Secondary muscles on the front
    pub front_secondary: Vec<String>,
    /// Secondary muscles on the back
    pub back_secondary: Vec<String>,
}

/// Day with its sets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalDay {
    /// Day row
    pub day: Day,
    /// Weekday names
    pub day_names: Vec<&'static str>,
    /// Sets in order
    pub sets: Vec<CanonicalSet>,
    /// Muscle summary
    pub muscles: MuscleSummary,
}

/// Complete nested representation of a workout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalWorkout {
    /// Workout row
    pub workout: Workout,
    /// Days
    pub days: Vec<CanonicalDay>,
}

/// Assemble the nested representation of a workout
#[must_use]
pub fn build_canonical(
    workout: Workout,
    components: WorkoutComponents,
    unit: MassUnit,
) -> CanonicalWorkout {
    let WorkoutComponents {
        days,
        sets,
        settings,
        exercises,
        muscles,
    } = components;

    let days = days
        .into_iter()
        .map(|day| {
            let mut day_sets: Vec<&ExerciseSet> =
                sets.iter().filter(|set| set.day_id == day.id).collect();
            day_sets.sort_by_key(|set| set.order);

            let canonical_sets: Vec<CanonicalSet> = day_sets
                .into_iter()
                .map(|set| canonical_set(set, &settings, &exercises, unit))
                .collect();

            let exercise_ids = canonical_sets
                .iter()
                .flat_map(|set| set.exercises.iter().map(|e| e.exercise_id));

            CanonicalDay {
                day_names: day.days_of_week.iter().map(DayOfWeek::name).collect(),
                muscles: muscle_summary(exercise_ids, &exercises, &muscles),
                sets: canonical_sets,
                day,
            }
        })
        .collect();

    CanonicalWorkout { workout, days }
}

fn canonical_set(
    set: &ExerciseSet,
    settings: &[Setting],
    exercises: &HashMap<Uuid, Exercise>,
    unit: MassUnit,
) -> CanonicalSet {
    let entries = set
        .exercises
        .iter()
        .map(|exercise_id| {
            let mut own: Vec<&Setting> = settings
                .iter()
                .filter(|s| s.set_id == set.id && s.exercise_id == *exercise_id)
                .collect();
            own.sort_by_key(|s| s.order);

            CanonicalExercise {
                exercise_id: *exercise_id,
                name: exercises
                    .get(exercise_id)
                    .map(|e| e.name.clone())
                    .unwrap_or_default(),
                reps_text: reps_smart_text(set.sets, &own, unit),
                settings: own.into_iter().cloned().collect(),
            }
        })
        .collect();

    CanonicalSet {
        set: set.clone(),
        is_superset: set.exercises.len() > 1,
        exercises: entries,
    }
}

fn muscle_summary(
    exercise_ids: impl Iterator<Item = Uuid>,
    exercises: &HashMap<Uuid, Exercise>,
    muscles: &HashMap<Uuid, Muscle>,
) -> MuscleSummary {
    let mut primary = BTreeSet::new();
    let mut secondary = BTreeSet::new();
    for exercise in exercise_ids.filter_map(|id| exercises.get(&id)) {
        primary.extend(exercise.muscles.iter().copied());
        secondary.extend(exercise.muscles_secondary.iter().copied());
    }
    // A muscle trained as primary anywhere on the day is not listed as secondary
    let secondary: BTreeSet<Uuid> = secondary.difference(&primary).copied().collect();

    let split = |ids: &BTreeSet<Uuid>, front: bool| -> Vec<String> {
        let mut names: Vec<String> = ids
            .iter()
            .filter_map(|id| muscles.get(id))
            .filter(|m| m.is_front == front)
            .map(|m| m.name.clone())
            .collect();
        names.sort();
        names
    };

    MuscleSummary {
        front: split(&primary, true),
        back: split(&primary, false),
        front_secondary: split(&secondary, true),
        back_secondary: split(&secondary, false),
    }
}

/// Check the days of week of a training day
///
/// # Errors
///
/// Returns a validation error when no weekday is selected
pub fn validate_days_of_week(days: &[DayOfWeek]) -> AppResult<()> {
    if days.is_empty() {
        return Err(AppError::invalid_field(
            "days_of_week",
            "Select at least one day of the week",
        ));
    }
    Ok(())
}

/// Check the time pair of a workout session
///
/// # Errors
///
/// Returns a validation error when only one time is given or the start is not
/// before the end
pub fn validate_session_times(
    time_start: Option<NaiveTime>,
    time_end: Option<NaiveTime>,
) -> AppResult<()> {
    match (time_start, time_end) {
        (None, None) => Ok(()),
        (Some(_), None) => Err(AppError::invalid_field(
            "time_end",
            "If you enter a start time, you must also enter an end time",
        )),
        (None, Some(_)) => Err(AppError::invalid_field(
            "time_start",
            "If you enter an end time, you must also enter a start time",
        )),
        (Some(start), Some(end)) if start >= end => Err(AppError::invalid_field(
            "time_end",
            "The session cannot end before it starts",
        )),
        (Some(_), Some(_)) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModerationStatus;
    use chrono::{NaiveDate, Utc};

    fn setting(set_id: Uuid, exercise_id: Uuid, order: u32, reps: u32) -> Setting {
        Setting {
            id: Uuid::new_v4(),
            set_id,
            exercise_id,
            reps,
            weight: None,
            rir: None,
            order,
            comment: String::new(),
        }
    }

    fn exercise(name: &str, muscles: Vec<Uuid>, secondary: Vec<Uuid>) -> Exercise {
        Exercise {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: String::new(),
            category_id: Uuid::new_v4(),
            language_id: Uuid::new_v4(),
            muscles,
            muscles_secondary: secondary,
            equipment: vec![],
            status: ModerationStatus::Accepted,
            license_author: None,
            author_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_smart_text_single_setting() {
        let s = setting(Uuid::nil(), Uuid::nil(), 1, 10);
        assert_eq!(reps_smart_text(4, &[&s], MassUnit::Kg), "4 × 10");
    }

    #[test]
    fn test_smart_text_multiple_settings_and_failure() {
        let a = setting(Uuid::nil(), Uuid::nil(), 1, 10);
        let b = setting(Uuid::nil(), Uuid::nil(), 2, 8);
        let c = setting(Uuid::nil(), Uuid::nil(), 3, 99);
        assert_eq!(
            reps_smart_text(3, &[&a, &b, &c], MassUnit::Kg),
            "10 – 8 – ∞"
        );
    }

    #[test]
    fn test_smart_text_with_weight() {
        let mut s = setting(Uuid::nil(), Uuid::nil(), 1, 5);
        s.weight = Some(100.0);
        assert_eq!(reps_smart_text(5, &[&s], MassUnit::Kg), "5 × 5 (100 kg)");
        s.weight = Some(42.5);
        assert_eq!(reps_smart_text(5, &[&s], MassUnit::Lb), "5 × 5 (42.5 lb)");
        assert_eq!(reps_smart_text(5, &[], MassUnit::Kg), "");
    }

    #[test]
    fn test_build_canonical_orders_sets_and_summarizes_muscles() {
        let chest = Muscle {
            id: Uuid::new_v4(),
            name: "Chest".to_owned(),
            is_front: true,
        };
        let triceps = Muscle {
            id: Uuid::new_v4(),
            name: "Triceps".to_owned(),
            is_front: false,
        };
        let bench = exercise("Bench press", vec![chest.id], vec![triceps.id]);
        let dips = exercise("Dips", vec![triceps.id], vec![chest.id]);

        let workout = Workout {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Push".to_owned(),
            created: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let day = Day {
            id: Uuid::new_v4(),
            workout_id: workout.id,
            description: "Push day".to_owned(),
            days_of_week: vec![DayOfWeek::Monday, DayOfWeek::Thursday],
        };
        let second = ExerciseSet {
            id: Uuid::new_v4(),
            day_id: day.id,
            order: 2,
            sets: 3,
            exercises: vec![dips.id],
        };
        let first = ExerciseSet {
            id: Uuid::new_v4(),
            day_id: day.id,
            order: 1,
            sets: 4,
            exercises: vec![bench.id],
        };

        let components = WorkoutComponents {
            days: vec![day],
            settings: vec![
                setting(first.id, bench.id, 1, 8),
                setting(second.id, dips.id, 2, 10),
                setting(second.id, dips.id, 1, 12),
            ],
            sets: vec![second, first],
            exercises: [(bench.id, bench), (dips.id, dips)].into_iter().collect(),
            muscles: [(chest.id, chest), (triceps.id, triceps)]
                .into_iter()
                .collect(),
        };

        let canonical = build_canonical(workout, components, MassUnit::Kg);
        let day = &canonical.days[0];

        assert_eq!(day.day_names, vec!["Monday", "Thursday"]);
        assert_eq!(day.sets[0].set.order, 1);
        assert_eq!(day.sets[0].exercises[0].reps_text, "4 × 8");
        assert_eq!(day.sets[1].exercises[0].name, "Dips");
        assert_eq!(day.sets[1].exercises[0].reps_text, "12 – 10");
        assert_eq!(day.muscles.front, vec!["Chest"]);
        assert_eq!(day.muscles.back, vec!["Triceps"]);
        assert!(day.muscles.front_secondary.is_empty());
    }

    #[test]
    fn test_session_time_pair_invariant() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0);
        let ten = NaiveTime::from_hms_opt(10, 0, 0);

        assert!(validate_session_times(None, None).is_ok());
        assert!(validate_session_times(nine, ten).is_ok());
        assert!(validate_session_times(nine, None).is_err());
        assert!(validate_session_times(None, ten).is_err());
        assert!(validate_session_times(ten, nine).is_err());
        assert!(validate_session_times(nine, nine).is_err());
    }

    #[test]
    fn test_day_requires_weekday() {
        assert!(validate_days_of_week(&[]).is_err());
        assert!(validate_days_of_week(&[DayOfWeek::Friday]).is_ok());
    }
}
