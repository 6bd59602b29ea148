// ABOUTME: Reminder jobs for expiring workouts, missing weight entries and inactive gym members
// ABOUTME: Delivery goes through the Notifier trait, the default implementation writes to the log
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Workout and weight reminders
//!
//! The selection rules live in [`workout_core::reminders`]. This module loads
//! the inputs for every user, hands due reminders to a [`Notifier`] and
//! records when a workout reminder was sent so the cooldown applies on the
//! next run.
//!
//! Gym staff who enabled the inactivity overview get a separate report
//! listing members without recent training.

use crate::database::Database;
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::middleware::create_job_span;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn, Instrument};
use workout_core::gym::MemberActivity;
use workout_core::models::{Gym, User};
use workout_core::permissions::Permissions;
use workout_core::reminders::{
    weight_reminder, workout_reminder, ReminderInput, WeightReminder, WorkoutReminder,
};

/// Delivery channel for reminders
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell the user their current workout is about to run out
    async fn notify_workout(&self, user: &User, reminder: &WorkoutReminder) -> AppResult<()>;

    /// Ask the user to enter their body weight
    async fn notify_weight(&self, user: &User, reminder: &WeightReminder) -> AppResult<()>;

    /// Send a staff member the list of inactive members of their gym
    async fn notify_inactive_members(
        &self,
        recipient: &User,
        gym: &Gym,
        members: &[MemberActivity],
    ) -> AppResult<()>;
}

/// Notifier that only writes structured log events
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_workout(&self, user: &User, reminder: &WorkoutReminder) -> AppResult<()> {
        info!(
            user_id = %user.id,
            email = user.email.as_deref().unwrap_or_default(),
            workout_id = %reminder.workout_id,
            days_left = reminder.days_left,
            "Workout reminder"
        );
        Ok(())
    }

    async fn notify_weight(&self, user: &User, reminder: &WeightReminder) -> AppResult<()> {
        info!(
            user_id = %user.id,
            email = user.email.as_deref().unwrap_or_default(),
            days_since_last_entry = ?reminder.days_since_last_entry,
            "Weight reminder"
        );
        Ok(())
    }

    async fn notify_inactive_members(
        &self,
        recipient: &User,
        gym: &Gym,
        members: &[MemberActivity],
    ) -> AppResult<()> {
        let names: Vec<&str> = members.iter().map(|m| m.username.as_str()).collect();
        info!(
            user_id = %recipient.id,
            gym_id = %gym.id,
            inactive = members.len(),
            members = ?names,
            "Inactive members report"
        );
        Ok(())
    }
}

/// Counters of one reminder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderSummary {
    /// Users looked at
    pub users_checked: usize,
    /// Workout reminders delivered
    pub workout_reminders: usize,
    /// Weight reminders delivered
    pub weight_reminders: usize,
    /// Deliveries that failed
    pub failures: usize,
}

/// Which reminders a run sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderKinds {
    /// Expiring workouts
    pub workouts: bool,
    /// Missing weight entries
    pub weight: bool,
}

impl Default for ReminderKinds {
    fn default() -> Self {
        Self {
            workouts: true,
            weight: true,
        }
    }
}

/// Evaluate and deliver reminders for every active user
///
/// A failed delivery is logged and counted but does not stop the run. The
/// workout notification date is only stored after a successful delivery.
///
/// # Errors
///
/// Returns an error if loading users or their data fails
pub async fn send_reminders(
    database: &Database,
    notifier: &dyn Notifier,
    kinds: ReminderKinds,
    today: NaiveDate,
) -> AppResult<ReminderSummary> {
    async move {
        let users = database.users();
        let mut summary = ReminderSummary::default();

        for (user, profile) in users.list_users_with_profiles().await? {
            if !user.is_active || profile.is_temporary {
                continue;
            }
            summary.users_checked += 1;

            if kinds.workouts {
                let workouts = database.workouts().list_workouts(user.id).await?;
                let active = database.schedules().active_schedule(user.id).await?;
                let input = ReminderInput {
                    profile: &profile,
                    email: user.email.as_deref(),
                    workouts: &workouts,
                    active_schedule: active
                        .as_ref()
                        .map(|(schedule, steps)| (schedule, steps.as_slice())),
                };
                if let Some(reminder) = workout_reminder(&input, today) {
                    match notifier.notify_workout(&user, &reminder).await {
                        Ok(()) => {
                            users.set_last_workout_notification(user.id, today).await?;
                            summary.workout_reminders += 1;
                        }
                        Err(e) => {
                            warn!(user_id = %user.id, "Workout reminder failed: {e}");
                            summary.failures += 1;
                        }
                    }
                }
            }

            if kinds.weight {
                let last_entry = database.weight().latest_entry(user.id).await?.map(|e| e.date);
                if let Some(reminder) = weight_reminder(&profile, last_entry, today) {
                    match notifier.notify_weight(&user, &reminder).await {
                        Ok(()) => summary.weight_reminders += 1,
                        Err(e) => {
                            warn!(user_id = %user.id, "Weight reminder failed: {e}");
                            summary.failures += 1;
                        }
                    }
                }
            }
        }

        AppLogger::log_job_run(
            "email-reminders",
            summary.users_checked,
            summary.workout_reminders + summary.weight_reminders,
        );
        Ok(summary)
    }
    .instrument(create_job_span("email-reminders"))
    .await
}

/// Counters of one inactivity report run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InactivitySummary {
    /// Gyms looked at
    pub gyms_checked: usize,
    /// Reports delivered
    pub reports_sent: usize,
    /// Deliveries that failed
    pub failures: usize,
}

/// Report inactive members to the staff of every gym
///
/// Only members who allow inactivity reports are listed, and only trainers
/// and managers with the overview enabled receive a report. Gyms without
/// inactive members are skipped.
///
/// # Errors
///
/// Returns an error if loading gyms, members or configuration fails
pub async fn send_inactivity_reports(
    database: &Database,
    notifier: &dyn Notifier,
    today: NaiveDate,
) -> AppResult<InactivitySummary> {
    async move {
        let gyms = database.gyms();
        let mut summary = InactivitySummary::default();

        for gym in gyms.list_gyms().await? {
            summary.gyms_checked += 1;
            let inactive: Vec<MemberActivity> = gyms
                .member_activity(gym.id, today)
                .await?
                .into_iter()
                .filter(|member| member.inactive && member.include_inactive)
                .collect();
            if inactive.is_empty() {
                continue;
            }

            for (staff, _) in database.users().list_gym_users(gym.id).await? {
                if !staff.is_active || !staff.role.has(Permissions::GYM_TRAINER) {
                    continue;
                }
                if !gyms.get_admin_config(staff.id, gym.id).await?.overview_inactive {
                    continue;
                }
                match notifier.notify_inactive_members(&staff, &gym, &inactive).await {
                    Ok(()) => summary.reports_sent += 1,
                    Err(e) => {
                        warn!(
                            user_id = %staff.id,
                            gym_id = %gym.id,
                            "Inactivity report failed: {e}"
                        );
                        summary.failures += 1;
                    }
                }
            }
        }

        AppLogger::log_job_run("inactive-members", summary.gyms_checked, summary.reports_sent);
        Ok(summary)
    }
    .instrument(create_job_span("inactive-members"))
    .await
}
