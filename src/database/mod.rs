// ABOUTME: Database connection management, schema migrations and row conversion helpers
// ABOUTME: Wraps the sqlx SQLite pool and exposes one manager per domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! # Database Management
//!
//! All identifiers are stored as TEXT UUIDs, dates as `YYYY-MM-DD`, times as
//! `HH:MM:SS` and timestamps as RFC 3339 strings. Child rows reference their
//! parent with `ON DELETE CASCADE`, so deleting a workout or plan removes
//! everything below it.

/// Exercises, categories, muscles, equipment, languages and comments
pub mod exercises;
/// Groups, memberships and applications
pub mod groups;
/// Gyms, configuration, notes and contracts
pub mod gyms;
/// Ingredients and weight units
pub mod ingredients;
/// Workout logs and sessions
pub mod logs;
/// Nutrition plans, meals, items and diary
pub mod nutrition;
/// Schedules and steps
pub mod schedules;
/// Users and profiles
pub mod users;
/// Body weight entries
pub mod weight;
/// Workouts, days, sets and settings
pub mod workouts;

pub use exercises::{ExerciseFilter, ExerciseManager};
pub use groups::GroupManager;
pub use gyms::GymManager;
pub use ingredients::{IngredientFilter, IngredientManager};
pub use logs::{CalendarDay, WorkoutLogManager};
pub use nutrition::NutritionManager;
pub use schedules::ScheduleManager;
pub use users::UserManager;
pub use weight::{ImportReport, WeightManager};
pub use workouts::WorkoutManager;

use crate::config::DatabaseUrl;
use crate::constants::server_defaults;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

/// Database handle shared by all managers
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and create the schema
    ///
    /// # Errors
    ///
    /// Returns a database error if the connection or a migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let db = Self::connect(database_url).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Connect without touching the schema
    ///
    /// File databases are created when missing. In-memory databases use a
    /// single connection so every query sees the same data.
    ///
    /// # Errors
    ///
    /// Returns a database error if the connection fails
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let url = DatabaseUrl::parse_url(database_url);

        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(server_defaults::MAX_DB_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create all tables and seed reference rows
    ///
    /// # Errors
    ///
    /// Returns a database error if a statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_system().await?;
        self.migrate_gyms().await?;
        self.migrate_users().await?;
        self.migrate_exercises().await?;
        self.migrate_workouts().await?;
        self.migrate_logs().await?;
        self.migrate_schedules().await?;
        self.migrate_ingredients().await?;
        self.migrate_nutrition().await?;
        self.migrate_weight().await?;
        self.migrate_gym_administration().await?;
        self.migrate_groups().await?;
        info!("Database migrations complete");
        Ok(())
    }

    async fn migrate_system(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS system_secrets (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create system_secrets: {e}")))?;
        Ok(())
    }

    /// Return the stored secret for `key`, generating and storing it on first use
    ///
    /// # Errors
    ///
    /// Returns a database error if the secret cannot be read or written
    pub async fn get_or_create_system_secret(
        &self,
        key: &str,
        generate: impl FnOnce() -> String,
    ) -> AppResult<String> {
        let existing = sqlx::query("SELECT value FROM system_secrets WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to read system secret: {e}")))?;

        if let Some(row) = existing {
            return Ok(row.get("value"));
        }

        let value = generate();
        sqlx::query(
            "INSERT OR IGNORE INTO system_secrets (key, value, created_at) VALUES ($1, $2, $3)",
        )
        .bind(key)
        .bind(&value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store system secret: {e}")))?;

        let row = sqlx::query("SELECT value FROM system_secrets WHERE key = $1")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to read system secret: {e}")))?;
        Ok(row.get("value"))
    }

    /// Liveness check for the readiness endpoint
    ///
    /// # Errors
    ///
    /// Returns a database error if the pool cannot run a query
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// User and profile manager
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Exercise catalog manager
    #[must_use]
    pub fn exercises(&self) -> ExerciseManager {
        ExerciseManager::new(self.pool.clone())
    }

    /// Workout routine manager
    #[must_use]
    pub fn workouts(&self) -> WorkoutManager {
        WorkoutManager::new(self.pool.clone())
    }

    /// Workout log and session manager
    #[must_use]
    pub fn logs(&self) -> WorkoutLogManager {
        WorkoutLogManager::new(self.pool.clone())
    }

    /// Schedule manager
    #[must_use]
    pub fn schedules(&self) -> ScheduleManager {
        ScheduleManager::new(self.pool.clone())
    }

    /// Ingredient manager
    #[must_use]
    pub fn ingredients(&self) -> IngredientManager {
        IngredientManager::new(self.pool.clone())
    }

    /// Nutrition plan manager
    #[must_use]
    pub fn nutrition(&self) -> NutritionManager {
        NutritionManager::new(self.pool.clone())
    }

    /// Body weight manager
    #[must_use]
    pub fn weight(&self) -> WeightManager {
        WeightManager::new(self.pool.clone())
    }

    /// Gym manager
    #[must_use]
    pub fn gyms(&self) -> GymManager {
        GymManager::new(self.pool.clone())
    }

    /// Group manager
    #[must_use]
    pub fn groups(&self) -> GroupManager {
        GroupManager::new(self.pool.clone())
    }
}

/// Run a schema statement with a descriptive error
pub(crate) async fn execute_schema(pool: &SqlitePool, sql: &str, table: &str) -> AppResult<()> {
    sqlx::query(sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create {table}: {e}")))?;
    Ok(())
}

pub(crate) fn parse_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))
}

pub(crate) fn parse_optional_uuid(value: Option<String>) -> AppResult<Option<Uuid>> {
    value.as_deref().map(parse_uuid).transpose()
}

pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid timestamp '{value}': {e}")))
}

pub(crate) fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AppError::internal(format!("Invalid date '{value}': {e}")))
}

pub(crate) fn parse_optional_date(value: Option<String>) -> AppResult<Option<NaiveDate>> {
    value.as_deref().map(parse_date).transpose()
}

pub(crate) fn parse_optional_time(value: Option<String>) -> AppResult<Option<NaiveTime>> {
    value
        .as_deref()
        .map(|v| {
            NaiveTime::parse_from_str(v, "%H:%M:%S")
                .map_err(|e| AppError::internal(format!("Invalid time '{v}': {e}")))
        })
        .transpose()
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_time(time: Option<NaiveTime>) -> Option<String> {
    time.map(|t| t.format("%H:%M:%S").to_string())
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string(value)?)
}

pub(crate) fn from_json<T: DeserializeOwned>(value: &str) -> AppResult<T> {
    Ok(serde_json::from_str(value)?)
}

/// Read a non-negative integer column
pub(crate) fn get_u32(row: &sqlx::sqlite::SqliteRow, column: &str) -> u32 {
    let value: i64 = row.get(column);
    value.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_migrates_twice() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_system_secret_is_stable() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let first = db
            .get_or_create_system_secret("jwt_secret", || "generated".to_owned())
            .await
            .unwrap();
        let second = db
            .get_or_create_system_secret("jwt_secret", || "other".to_owned())
            .await
            .unwrap();
        assert_eq!(first, "generated");
        assert_eq!(second, "generated");
    }
}
