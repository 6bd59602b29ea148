// ABOUTME: Integration tests for the background jobs run from the command line
// ABOUTME: Covers reminders, inactivity reports, guest account cleanup and demo data seeding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use common::TestApp;
use std::sync::Mutex;
use uuid::Uuid;
use workout_core::gym::MemberActivity;
use workout_core::models::{Gym, GymAdminConfig, User};
use workout_core::permissions::UserRole;
use workout_core::reminders::{WeightReminder, WorkoutReminder};
use workout_manager::database::users::NewUser;
use workout_manager::demo_data::{seed_demo_data, DemoDataOptions};
use workout_manager::errors::{AppError, AppResult};
use workout_manager::reminders::{
    send_inactivity_reports, send_reminders, Notifier, ReminderKinds,
};

/// Notifier that keeps what it was asked to deliver
#[derive(Default)]
struct RecordingNotifier {
    workouts: Mutex<Vec<WorkoutReminder>>,
    weights: Mutex<Vec<WeightReminder>>,
    reports: Mutex<Vec<(Uuid, Vec<String>)>>,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.fail {
            Err(AppError::internal("mail server unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_workout(&self, _user: &User, reminder: &WorkoutReminder) -> AppResult<()> {
        self.check()?;
        self.workouts.lock().unwrap().push(reminder.clone());
        Ok(())
    }

    async fn notify_weight(&self, _user: &User, reminder: &WeightReminder) -> AppResult<()> {
        self.check()?;
        self.weights.lock().unwrap().push(reminder.clone());
        Ok(())
    }

    async fn notify_inactive_members(
        &self,
        recipient: &User,
        _gym: &Gym,
        members: &[MemberActivity],
    ) -> AppResult<()> {
        self.check()?;
        let names = members.iter().map(|m| m.username.clone()).collect();
        self.reports.lock().unwrap().push((recipient.id, names));
        Ok(())
    }
}

async fn create_gym(app: &TestApp, name: &str) -> Uuid {
    let gym = Gym {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        phone: None,
        email: None,
        owner: None,
        zip_code: None,
        city: None,
        street: None,
    };
    app.database().gyms().create_gym(&gym).await.unwrap();
    gym.id
}

// ============================================================================
// Workout and weight reminders
// ============================================================================

#[tokio::test]
async fn test_workout_reminder_respects_cooldown() {
    let app = TestApp::new().await;
    let user = app.user("forgetful").await;
    let users = app.database().users();
    let mut profile = users.get_profile(user.id).await.unwrap();
    profile.workout_reminder_active = true;
    profile.workout_reminder = 14;
    profile.workout_duration = 1;
    profile.num_days_weight_reminder = 0;
    users.update_profile(&profile).await.unwrap();
    let workout = app
        .database()
        .workouts()
        .create_workout(user.id, "Short block")
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    let notifier = RecordingNotifier::default();
    let summary = send_reminders(app.database(), &notifier, ReminderKinds::default(), today)
        .await
        .unwrap();

    assert_eq!(summary.workout_reminders, 1);
    assert_eq!(summary.weight_reminders, 0);
    let sent = notifier.workouts.lock().unwrap().clone();
    assert_eq!(sent[0].workout_id, workout.id);
    assert_eq!(sent[0].days_left, 7);
    assert_eq!(
        users.get_profile(user.id).await.unwrap().last_workout_notification,
        Some(today)
    );

    let again = send_reminders(app.database(), &notifier, ReminderKinds::default(), today)
        .await
        .unwrap();
    assert_eq!(again.workout_reminders, 0);
}

#[tokio::test]
async fn test_weight_reminder_after_interval() {
    let app = TestApp::new().await;
    let today = Utc::now().date_naive();
    let late = app.user("late").await;
    let recent = app.user("recent").await;
    let users = app.database().users();
    let weight = app.database().weight();

    for (user, days_ago) in [(&late, 10), (&recent, 2)] {
        let mut profile = users.get_profile(user.id).await.unwrap();
        profile.workout_reminder_active = false;
        profile.num_days_weight_reminder = 7;
        users.update_profile(&profile).await.unwrap();
        weight
            .import_entries(user.id, &[(today - Duration::days(days_ago), 75.0)])
            .await
            .unwrap();
    }

    let notifier = RecordingNotifier::default();
    let kinds = ReminderKinds {
        workouts: false,
        weight: true,
    };
    let summary = send_reminders(app.database(), &notifier, kinds, today).await.unwrap();

    assert_eq!(summary.weight_reminders, 1);
    let sent = notifier.weights.lock().unwrap().clone();
    assert_eq!(sent[0].user_id, late.id);
    assert_eq!(sent[0].days_since_last_entry, Some(10));
}

#[tokio::test]
async fn test_failed_delivery_is_counted_and_retried() {
    let app = TestApp::new().await;
    let user = app.user("unlucky").await;
    let users = app.database().users();
    let mut profile = users.get_profile(user.id).await.unwrap();
    profile.workout_reminder_active = true;
    profile.workout_reminder = 14;
    profile.workout_duration = 1;
    profile.num_days_weight_reminder = 0;
    users.update_profile(&profile).await.unwrap();
    app.database()
        .workouts()
        .create_workout(user.id, "Short block")
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    let summary = send_reminders(
        app.database(),
        &RecordingNotifier::failing(),
        ReminderKinds::default(),
        today,
    )
    .await
    .unwrap();
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.workout_reminders, 0);
    assert!(users
        .get_profile(user.id)
        .await
        .unwrap()
        .last_workout_notification
        .is_none());
}

// ============================================================================
// Inactivity reports
// ============================================================================

#[tokio::test]
async fn test_inactivity_report_goes_to_staff_with_overview() {
    let app = TestApp::new().await;
    let gym = create_gym(&app, "North").await;
    let trainer = app.gym_user("coach", UserRole::Trainer, gym).await;
    let manager = app.gym_user("manager", UserRole::GymManager, gym).await;
    app.gym_user("idle", UserRole::User, gym).await;
    app.database()
        .gyms()
        .set_admin_config(&GymAdminConfig {
            user_id: manager.id,
            gym_id: gym,
            overview_inactive: false,
        })
        .await
        .unwrap();

    let notifier = RecordingNotifier::default();
    let summary = send_inactivity_reports(app.database(), &notifier, Utc::now().date_naive())
        .await
        .unwrap();

    assert_eq!(summary.gyms_checked, 1);
    assert_eq!(summary.reports_sent, 1);
    let reports = notifier.reports.lock().unwrap().clone();
    assert_eq!(reports[0].0, trainer.id);
    assert!(reports[0].1.contains(&"idle".to_owned()));
}

#[tokio::test]
async fn test_no_report_without_gyms() {
    let app = TestApp::new().await;
    app.user("loner").await;

    let notifier = RecordingNotifier::default();
    let summary = send_inactivity_reports(app.database(), &notifier, Utc::now().date_naive())
        .await
        .unwrap();

    assert_eq!(summary.gyms_checked, 0);
    assert_eq!(summary.reports_sent, 0);
}

// ============================================================================
// Guest cleanup
// ============================================================================

#[tokio::test]
async fn test_delete_temporary_users_keeps_regular_accounts() {
    let app = TestApp::new().await;
    let regular = app.user("regular").await;
    let users = app.database().users();
    users
        .create_user(&NewUser {
            username: "guest-1234".to_owned(),
            email: None,
            password_hash: "unused".to_owned(),
            role: UserRole::User,
            is_temporary: true,
        })
        .await
        .unwrap();

    let none = users
        .delete_temporary_users(Utc::now() - Duration::days(7))
        .await
        .unwrap();
    assert_eq!(none, 0);

    let deleted = users
        .delete_temporary_users(Utc::now() + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert!(users.get_user(regular.id).await.unwrap().is_some());
    assert!(users.get_user_by_login("guest-1234").await.unwrap().is_none());
}

// ============================================================================
// Demo data
// ============================================================================

#[tokio::test]
async fn test_demo_data_seeds_and_reuses_accounts() {
    let app = TestApp::new().await;
    let options = DemoDataOptions {
        users: 2,
        workouts: 1,
        nutrition_plans: 1,
        weight_entries: 10,
        seed: 7,
    };
    let today = Utc::now().date_naive();

    let first = seed_demo_data(app.database(), &app.resources.auth_manager, &options, today)
        .await
        .unwrap();
    assert_eq!(first.users, 2);
    assert_eq!(first.workouts, 2);
    assert_eq!(first.nutrition_plans, 2);
    assert_eq!(first.weight_entries, 20);
    assert!(first.exercises > 0);
    assert!(first.ingredients > 0);
    assert!(first.logs > 0);

    let second = seed_demo_data(app.database(), &app.resources.auth_manager, &options, today)
        .await
        .unwrap();
    assert_eq!(second.users, 0);
    assert_eq!(second.exercises, 0);
    assert_eq!(second.weight_entries, 0);
    assert_eq!(second.workouts, 2);
    assert_eq!(app.database().users().count_users().await.unwrap(), 2);

    let demo = app
        .database()
        .users()
        .get_user_by_login("demo-user-1")
        .await
        .unwrap()
        .unwrap();
    let workouts = app.database().workouts().list_workouts(demo.id).await.unwrap();
    assert_eq!(workouts.len(), 2);
}
