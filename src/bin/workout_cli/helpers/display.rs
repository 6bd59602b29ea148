// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors
// ABOUTME: Output formatting helpers for workout-cli
// ABOUTME: Prints account and job results to the console

use workout_manager::reminders::{InactivitySummary, ReminderSummary};

/// Display the result of creating or promoting an administrator
pub fn display_admin_created(username: &str, email: Option<&str>, created: bool) {
    let action = if created { "created" } else { "promoted" };
    println!("\nAdmin user {action} successfully");
    println!("{}", "=".repeat(50));
    println!("   Username: {username}");
    println!("   Email: {}", email.unwrap_or("-"));
    println!("   Role: admin");
    println!("\nLog in with POST /api/v1/auth/login to obtain a token.");
}

/// Display the number of removed guest accounts
pub fn display_temporary_cleanup(deleted: u64, max_age_days: i64) {
    println!("Deleted {deleted} guest account(s) older than {max_age_days} day(s)");
}

/// Display reminder job counters
pub fn display_reminder_summary(summary: &ReminderSummary) {
    println!("Reminder run finished");
    println!("{}", "=".repeat(50));
    println!("   Users checked:     {}", summary.users_checked);
    println!("   Workout reminders: {}", summary.workout_reminders);
    println!("   Weight reminders:  {}", summary.weight_reminders);
    if summary.failures > 0 {
        println!("   Failed deliveries: {}", summary.failures);
    }
}

/// Display inactivity report counters
pub fn display_inactivity_summary(summary: &InactivitySummary) {
    println!("Inactivity report run finished");
    println!("{}", "=".repeat(50));
    println!("   Gyms checked: {}", summary.gyms_checked);
    println!("   Reports sent: {}", summary.reports_sent);
    if summary.failures > 0 {
        println!("   Failed deliveries: {}", summary.failures);
    }
}
