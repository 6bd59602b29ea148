// ABOUTME: Selects users who should be reminded about their workout or body weight
// ABOUTME: Pure decision logic used by the reminder maintenance job
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::constants::reminders::NOTIFICATION_COOLDOWN_DAYS;
use crate::models::{Schedule, ScheduleStep, UserProfile, Workout};
use crate::scheduling::{end_date, is_last_step, resolve_current_workout};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A workout that is about to run out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutReminder {
    /// User to notify
    pub user_id: Uuid,
    /// Workout running out
    pub workout_id: Uuid,
    /// Schedule that prescribed the workout
    pub schedule_id: Option<Uuid>,
    /// Days until the workout ends, negative when already over
    pub days_left: i64,
}

/// Inputs for one user's workout reminder
#[derive(Debug, Clone, Copy)]
pub struct ReminderInput<'a> {
    /// Profile with reminder preferences
    pub profile: &'a UserProfile,
    /// Contact address, users without one are skipped
    pub email: Option<&'a str>,
    /// The user's workouts
    pub workouts: &'a [Workout],
    /// Active schedule with its steps
    pub active_schedule: Option<(&'a Schedule, &'a [ScheduleStep])>,
}

/// Decide whether the user gets a workout reminder today
///
/// The workout is resolved like the current workout endpoint does it. A
/// workout picked by a non-looping schedule reminds only on the last step,
/// measured against the schedule's end; a running loop never ends. Otherwise
/// the newest workout lasts `profile.workout_duration` weeks from its
/// creation, also when the active schedule has not started or is over.
#[must_use]
pub fn workout_reminder(input: &ReminderInput<'_>, today: NaiveDate) -> Option<WorkoutReminder> {
    let profile = input.profile;
    if !profile.workout_reminder_active {
        return None;
    }
    if input.email.is_none_or(|email| email.trim().is_empty()) {
        return None;
    }
    if profile
        .last_workout_notification
        .is_some_and(|last| today - last < Duration::days(NOTIFICATION_COOLDOWN_DAYS))
    {
        return None;
    }

    let threshold = Duration::days(i64::from(profile.workout_reminder));
    let current = resolve_current_workout(input.active_schedule, input.workouts, today)?;

    let (delta, schedule_id) = match (input.active_schedule, current.step_id) {
        (Some((schedule, steps)), Some(step_id)) => {
            if schedule.is_loop {
                return None;
            }
            let step = steps.iter().find(|step| step.id == step_id)?;
            if !is_last_step(step, steps) {
                return None;
            }
            (end_date(schedule, steps)? - today, Some(schedule.id))
        }
        _ => {
            let workout = input.workouts.iter().find(|w| w.id == current.workout_id)?;
            let ends = workout.created + Duration::weeks(i64::from(profile.workout_duration));
            (ends - today, None)
        }
    };

    (delta < threshold).then(|| WorkoutReminder {
        user_id: profile.user_id,
        workout_id: current.workout_id,
        schedule_id,
        days_left: delta.num_days(),
    })
}

/// A user who has not logged their weight for a while
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightReminder {
    /// User to notify
    pub user_id: Uuid,
    /// Days since the last entry, `None` when there is none
    pub days_since_last_entry: Option<i64>,
}

/// Decide whether the user gets a weight reminder today
#[must_use]
pub fn weight_reminder(
    profile: &UserProfile,
    last_entry: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<WeightReminder> {
    if profile.num_days_weight_reminder == 0 {
        return None;
    }
    let interval = i64::from(profile.num_days_weight_reminder);
    let days_since = last_entry.map(|date| (today - date).num_days());
    if days_since.is_some_and(|days| days < interval) {
        return None;
    }
    Some(WeightReminder {
        user_id: profile.user_id,
        days_since_last_entry: days_since,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn workout(user_id: Uuid, created: NaiveDate) -> Workout {
        Workout {
            id: Uuid::new_v4(),
            user_id,
            name: "Strength".to_owned(),
            created,
        }
    }

    #[test]
    fn test_reminds_when_workout_runs_out() {
        let profile = UserProfile::with_defaults(Uuid::new_v4());
        // 12 weeks from 2024-01-01 ends 2024-03-25, 14 day window starts 2024-03-12
        let workouts = vec![workout(profile.user_id, date(2024, 1, 1))];
        let input = ReminderInput {
            profile: &profile,
            email: Some("user@example.com"),
            workouts: &workouts,
            active_schedule: None,
        };

        assert!(workout_reminder(&input, date(2024, 3, 11)).is_none());
        let reminder = workout_reminder(&input, date(2024, 3, 12)).unwrap();
        assert_eq!(reminder.days_left, 13);
        assert_eq!(reminder.workout_id, workouts[0].id);
    }

    #[test]
    fn test_skips_without_email_or_recent_notification() {
        let mut profile = UserProfile::with_defaults(Uuid::new_v4());
        let workouts = vec![workout(profile.user_id, date(2024, 1, 1))];
        let today = date(2024, 4, 1);

        let no_email = ReminderInput {
            profile: &profile,
            email: None,
            workouts: &workouts,
            active_schedule: None,
        };
        assert!(workout_reminder(&no_email, today).is_none());

        profile.last_workout_notification = Some(date(2024, 3, 28));
        let recent = ReminderInput {
            profile: &profile,
            email: Some("user@example.com"),
            workouts: &workouts,
            active_schedule: None,
        };
        assert!(workout_reminder(&recent, today).is_none());
    }

    #[test]
    fn test_schedule_reminds_only_on_last_step() {
        let profile = UserProfile::with_defaults(Uuid::new_v4());
        let schedule = Schedule {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            name: "Block".to_owned(),
            start_date: date(2024, 1, 1),
            is_active: true,
            is_loop: false,
        };
        let steps = vec![
            ScheduleStep {
                id: Uuid::new_v4(),
                schedule_id: schedule.id,
                workout_id: Uuid::new_v4(),
                duration: 4,
                order: 1,
            },
            ScheduleStep {
                id: Uuid::new_v4(),
                schedule_id: schedule.id,
                workout_id: Uuid::new_v4(),
                duration: 4,
                order: 2,
            },
        ];
        let input = ReminderInput {
            profile: &profile,
            email: Some("user@example.com"),
            workouts: &[],
            active_schedule: Some((&schedule, &steps)),
        };

        // Still on step one although within 14 days of its end
        assert!(workout_reminder(&input, date(2024, 1, 20)).is_none());
        // Schedule ends 2024-02-26
        let reminder = workout_reminder(&input, date(2024, 2, 20)).unwrap();
        assert_eq!(reminder.workout_id, steps[1].workout_id);
        assert_eq!(reminder.days_left, 6);

        let looping = Schedule {
            is_loop: true,
            ..schedule.clone()
        };
        let input = ReminderInput {
            active_schedule: Some((&looping, &steps)),
            ..input
        };
        assert!(workout_reminder(&input, date(2024, 2, 20)).is_none());
    }

    #[test]
    fn test_schedule_outside_its_window_uses_latest_workout() {
        let profile = UserProfile::with_defaults(Uuid::new_v4());
        // 12 weeks from 2024-01-01 ends 2024-03-25
        let workouts = vec![workout(profile.user_id, date(2024, 1, 1))];
        let finished = Schedule {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            name: "Old block".to_owned(),
            start_date: date(2023, 1, 2),
            is_active: true,
            is_loop: false,
        };
        let steps = vec![ScheduleStep {
            id: Uuid::new_v4(),
            schedule_id: finished.id,
            workout_id: Uuid::new_v4(),
            duration: 2,
            order: 1,
        }];
        let input = ReminderInput {
            profile: &profile,
            email: Some("user@example.com"),
            workouts: &workouts,
            active_schedule: Some((&finished, &steps)),
        };

        let reminder = workout_reminder(&input, date(2024, 3, 20)).unwrap();
        assert_eq!(reminder.workout_id, workouts[0].id);
        assert_eq!(reminder.schedule_id, None);
        assert_eq!(reminder.days_left, 5);

        let upcoming_loop = Schedule {
            start_date: date(2024, 6, 3),
            is_loop: true,
            ..finished.clone()
        };
        let input = ReminderInput {
            active_schedule: Some((&upcoming_loop, &steps)),
            ..input
        };
        let reminder = workout_reminder(&input, date(2024, 3, 20)).unwrap();
        assert_eq!(reminder.workout_id, workouts[0].id);
        assert_eq!(reminder.days_left, 5);
    }

    #[test]
    fn test_weight_reminder() {
        let mut profile = UserProfile::with_defaults(Uuid::new_v4());
        let today = date(2024, 5, 10);
        assert!(weight_reminder(&profile, None, today).is_none());

        profile.num_days_weight_reminder = 7;
        assert!(weight_reminder(&profile, Some(date(2024, 5, 5)), today).is_none());
        assert_eq!(
            weight_reminder(&profile, Some(date(2024, 5, 1)), today)
                .unwrap()
                .days_since_last_entry,
            Some(9)
        );
        assert!(weight_reminder(&profile, None, today).is_some());
    }
}
