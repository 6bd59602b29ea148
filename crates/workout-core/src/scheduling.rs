// ABOUTME: Resolves which workout a schedule prescribes on a given date
// ABOUTME: Walks cumulative step durations from the start date, wrapping for looping schedules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::models::{Schedule, ScheduleStep, Workout};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Steps sorted by their position
fn ordered(steps: &[ScheduleStep]) -> Vec<&ScheduleStep> {
    let mut sorted: Vec<&ScheduleStep> = steps.iter().collect();
    sorted.sort_by_key(|step| step.order);
    sorted
}

/// Sum of all step durations in weeks
#[must_use]
pub fn total_weeks(steps: &[ScheduleStep]) -> u32 {
    steps.iter().map(|step| step.duration).sum()
}

/// Whole weeks elapsed since the schedule started, `None` before the start
#[must_use]
pub fn elapsed_weeks(start_date: NaiveDate, today: NaiveDate) -> Option<u32> {
    let days = (today - start_date).num_days();
    if days < 0 {
        return None;
    }
    u32::try_from(days / 7).ok()
}

/// The step in effect on `today`
///
/// Inactive schedules, schedules without steps and dates before the start
/// have no current step. Past the last step a looping schedule starts over
/// while a non-looping one has ended.
#[must_use]
pub fn current_step<'a>(
    schedule: &Schedule,
    steps: &'a [ScheduleStep],
    today: NaiveDate,
) -> Option<&'a ScheduleStep> {
    if !schedule.is_active {
        return None;
    }

    let total = total_weeks(steps);
    if total == 0 {
        return None;
    }

    let mut weeks = elapsed_weeks(schedule.start_date, today)?;
    if weeks >= total {
        if !schedule.is_loop {
            return None;
        }
        weeks %= total;
    }

    let mut cumulative = 0;
    for step in ordered(steps) {
        cumulative += step.duration;
        if weeks < cumulative {
            return Some(step);
        }
    }
    None
}

/// Calendar window covered by one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepWindow {
    /// Step
    pub step_id: Uuid,
    /// Workout trained during the window
    pub workout_id: Uuid,
    /// First day
    pub start: NaiveDate,
    /// Day after the last day
    pub end: NaiveDate,
}

/// First pass through the schedule laid out on the calendar
#[must_use]
pub fn step_windows(schedule: &Schedule, steps: &[ScheduleStep]) -> Vec<StepWindow> {
    let mut start = schedule.start_date;
    ordered(steps)
        .into_iter()
        .map(|step| {
            let end = start + Duration::weeks(i64::from(step.duration));
            let window = StepWindow {
                step_id: step.id,
                workout_id: step.workout_id,
                start,
                end,
            };
            start = end;
            window
        })
        .collect()
}

/// Date the schedule ends, `None` for looping schedules
#[must_use]
pub fn end_date(schedule: &Schedule, steps: &[ScheduleStep]) -> Option<NaiveDate> {
    if schedule.is_loop {
        return None;
    }
    Some(schedule.start_date + Duration::weeks(i64::from(total_weeks(steps))))
}

/// Whether `step` is the last step of the schedule
#[must_use]
pub fn is_last_step(step: &ScheduleStep, steps: &[ScheduleStep]) -> bool {
    ordered(steps).last().is_some_and(|last| last.id == step.id)
}

/// Workout the user should currently train
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentWorkout {
    /// Workout
    pub workout_id: Uuid,
    /// Schedule that selected it, absent for the latest workout fallback
    pub schedule_id: Option<Uuid>,
    /// Step that selected it
    pub step_id: Option<Uuid>,
}

/// Resolve the current workout from the active schedule, falling back to the
/// most recently created workout
#[must_use]
pub fn resolve_current_workout(
    active: Option<(&Schedule, &[ScheduleStep])>,
    workouts: &[Workout],
    today: NaiveDate,
) -> Option<CurrentWorkout> {
    if let Some((schedule, steps)) = active {
        if let Some(step) = current_step(schedule, steps, today) {
            return Some(CurrentWorkout {
                workout_id: step.workout_id,
                schedule_id: Some(schedule.id),
                step_id: Some(step.id),
            });
        }
    }

    workouts
        .iter()
        .max_by_key(|workout| workout.created)
        .map(|workout| CurrentWorkout {
            workout_id: workout.id,
            schedule_id: None,
            step_id: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(start: NaiveDate, is_loop: bool) -> Schedule {
        Schedule {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Rotation".to_owned(),
            start_date: start,
            is_active: true,
            is_loop,
        }
    }

    fn step(schedule_id: Uuid, order: u32, duration: u32) -> ScheduleStep {
        ScheduleStep {
            id: Uuid::new_v4(),
            schedule_id,
            workout_id: Uuid::new_v4(),
            duration,
            order,
        }
    }

    fn fixture(is_loop: bool) -> (Schedule, Vec<ScheduleStep>) {
        let s = schedule(date(2024, 1, 1), is_loop);
        // Deliberately out of order: positions 2, 1, 3
        let steps = vec![step(s.id, 2, 3), step(s.id, 1, 2), step(s.id, 3, 1)];
        (s, steps)
    }

    #[test]
    fn test_before_start_has_no_step() {
        let (s, steps) = fixture(false);
        assert!(current_step(&s, &steps, date(2023, 12, 31)).is_none());
    }

    #[test]
    fn test_walks_steps_in_order() {
        let (s, steps) = fixture(false);
        // weeks 0-1 -> order 1, weeks 2-4 -> order 2, week 5 -> order 3
        assert_eq!(current_step(&s, &steps, date(2024, 1, 1)).unwrap().order, 1);
        assert_eq!(current_step(&s, &steps, date(2024, 1, 14)).unwrap().order, 1);
        assert_eq!(current_step(&s, &steps, date(2024, 1, 15)).unwrap().order, 2);
        assert_eq!(current_step(&s, &steps, date(2024, 2, 4)).unwrap().order, 2);
        assert_eq!(current_step(&s, &steps, date(2024, 2, 5)).unwrap().order, 3);
    }

    #[test]
    fn test_non_loop_ends_after_last_step() {
        let (s, steps) = fixture(false);
        assert!(current_step(&s, &steps, date(2024, 2, 12)).is_none());
    }

    #[test]
    fn test_loop_wraps_around() {
        let (s, steps) = fixture(true);
        // week 6 wraps to week 0, week 8 wraps to week 2
        assert_eq!(current_step(&s, &steps, date(2024, 2, 12)).unwrap().order, 1);
        assert_eq!(current_step(&s, &steps, date(2024, 2, 26)).unwrap().order, 2);
    }

    #[test]
    fn test_inactive_or_empty_schedule() {
        let (mut s, steps) = fixture(true);
        assert!(current_step(&s, &[], date(2024, 1, 1)).is_none());
        s.is_active = false;
        assert!(current_step(&s, &steps, date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_step_windows_and_end_date() {
        let (s, steps) = fixture(false);
        let windows = step_windows(&s, &steps);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start, date(2024, 1, 1));
        assert_eq!(windows[0].end, date(2024, 1, 15));
        assert_eq!(windows[2].start, date(2024, 2, 5));
        assert_eq!(end_date(&s, &steps), Some(date(2024, 2, 12)));

        let (looping, steps) = fixture(true);
        assert!(end_date(&looping, &steps).is_none());
    }

    #[test]
    fn test_last_step_detection() {
        let (_, steps) = fixture(false);
        let last = steps.iter().find(|s| s.order == 3).unwrap();
        let first = steps.iter().find(|s| s.order == 1).unwrap();
        assert!(is_last_step(last, &steps));
        assert!(!is_last_step(first, &steps));
    }

    #[test]
    fn test_current_workout_falls_back_to_latest() {
        let user = Uuid::new_v4();
        let older = Workout {
            id: Uuid::new_v4(),
            user_id: user,
            name: "Old".to_owned(),
            created: date(2023, 1, 1),
        };
        let newer = Workout {
            id: Uuid::new_v4(),
            user_id: user,
            name: "New".to_owned(),
            created: date(2023, 6, 1),
        };
        let workouts = vec![older, newer.clone()];

        let fallback = resolve_current_workout(None, &workouts, date(2024, 1, 1)).unwrap();
        assert_eq!(fallback.workout_id, newer.id);
        assert!(fallback.schedule_id.is_none());

        let (s, steps) = fixture(false);
        let scheduled =
            resolve_current_workout(Some((&s, &steps)), &workouts, date(2024, 1, 1)).unwrap();
        assert_eq!(scheduled.schedule_id, Some(s.id));

        let ended =
            resolve_current_workout(Some((&s, &steps)), &workouts, date(2025, 1, 1)).unwrap();
        assert_eq!(ended.workout_id, newer.id);

        assert!(resolve_current_workout(None, &[], date(2024, 1, 1)).is_none());
    }
}
