// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory server resources, the full router and user creation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `workout_manager`

use axum::Router;
use chrono::Utc;
use std::sync::{Arc, Once};
use uuid::Uuid;
use workout_core::models::{Exercise, Ingredient, ModerationStatus};
use workout_core::permissions::UserRole;
use workout_manager::{
    config::ServerConfig,
    database::{users::NewUser, Database},
    resources::ServerResources,
    server::WorkoutServer,
};

static INIT_LOGGER: Once = Once::new();

/// Password used by every account created through these helpers
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Standard in-memory database with the schema applied
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:").await.expect("Failed to create test database")
}

/// Account created for a test with a valid bearer token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

/// Server resources plus the assembled router
pub struct TestApp {
    pub resources: Arc<ServerResources>,
}

impl TestApp {
    pub async fn new() -> Self {
        init_test_logging();
        let resources = ServerResources::initialize(ServerConfig::for_testing())
            .await
            .expect("Failed to initialize server resources");
        Self {
            resources: Arc::new(resources),
        }
    }

    /// Full application router with middleware
    pub fn router(&self) -> Router {
        WorkoutServer::router(Arc::clone(&self.resources))
    }

    pub fn database(&self) -> &Database {
        &self.resources.database
    }

    /// Create a regular user directly in the database
    pub async fn user(&self, username: &str) -> TestUser {
        self.user_with_role(username, UserRole::User).await
    }

    /// Create a user with the given role directly in the database
    pub async fn user_with_role(&self, username: &str, role: UserRole) -> TestUser {
        let password_hash = self
            .resources
            .auth_manager
            .hash_password(TEST_PASSWORD)
            .await
            .unwrap();
        let user = self
            .database()
            .users()
            .create_user(&NewUser {
                username: username.to_owned(),
                email: Some(format!("{username}@example.com")),
                password_hash,
                role,
                is_temporary: false,
            })
            .await
            .unwrap();
        let token = self.resources.auth_manager.generate_token(&user).unwrap();
        TestUser {
            id: user.id,
            username: user.username,
            token: token.access_token,
        }
    }

    /// Create a user with a role and place them in a gym
    pub async fn gym_user(&self, username: &str, role: UserRole, gym_id: Uuid) -> TestUser {
        let user = self.user_with_role(username, role).await;
        self.database().users().set_gym(user.id, Some(gym_id)).await.unwrap();
        user
    }

    /// Accepted catalogue exercise in a fresh category
    pub async fn exercise(&self, name: &str) -> Uuid {
        let exercises = self.database().exercises();
        let language = exercises.default_language().await.unwrap();
        let category = exercises.create_category(&format!("{name} category")).await.unwrap();
        let exercise = Exercise {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: String::new(),
            category_id: category.id,
            language_id: language.id,
            muscles: Vec::new(),
            muscles_secondary: Vec::new(),
            equipment: Vec::new(),
            status: ModerationStatus::Accepted,
            license_author: None,
            author_id: None,
            created_at: Utc::now(),
        };
        exercises.create_exercise(&exercise).await.unwrap();
        exercise.id
    }

    /// Accepted catalogue ingredient, values per 100 g
    pub async fn ingredient(&self, name: &str, protein: f64, carbohydrates: f64, fat: f64) -> Uuid {
        let language = self.database().exercises().default_language().await.unwrap();
        let now = Utc::now();
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            language_id: language.id,
            name: name.to_owned(),
            energy: protein * 4.0 + carbohydrates * 4.0 + fat * 9.0,
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
            created_at: now,
            updated_at: now,
        };
        self.database()
            .ingredients()
            .create_ingredient(&ingredient)
            .await
            .unwrap();
        ingredient.id
    }
}
