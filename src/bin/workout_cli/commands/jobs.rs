// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors
// ABOUTME: Scheduled job commands for workout-cli
// ABOUTME: Runs the reminder and inactive member jobs with the logging notifier

use crate::helpers::display::{display_inactivity_summary, display_reminder_summary};
use anyhow::Result;
use chrono::Utc;
use workout_manager::{
    database::Database,
    reminders::{send_inactivity_reports, send_reminders, LogNotifier, ReminderKinds},
};

/// Send due workout and weight reminders
pub async fn email_reminders(database: &Database, workouts: bool, weight: bool) -> Result<()> {
    let kinds = ReminderKinds { workouts, weight };
    let today = Utc::now().date_naive();
    let summary = send_reminders(database, &LogNotifier, kinds, today).await?;
    display_reminder_summary(&summary);
    Ok(())
}

/// Send inactivity reports to gym staff
pub async fn inactive_members(database: &Database) -> Result<()> {
    let today = Utc::now().date_naive();
    let summary = send_inactivity_reports(database, &LogNotifier, today).await?;
    display_inactivity_summary(&summary);
    Ok(())
}
