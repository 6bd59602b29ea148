// ABOUTME: Database operations for workout schedules and their steps
// ABOUTME: Keeps at most one active schedule per user by deactivating the others on save
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{execute_schema, format_date, get_u32, parse_date, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;
use workout_core::models::{Schedule, ScheduleStep};

impl Database {
    pub(super) async fn migrate_schedules(&self) -> AppResult<()> {
        execute_schema(
            self.pool(),
            r"
            CREATE TABLE IF NOT EXISTS schedules (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                start_date TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_loop INTEGER NOT NULL DEFAULT 0
            )
            ",
            "schedules",
        )
        .await?;
        execute_schema(
            self.pool(),
            r"
            CREATE TABLE IF NOT EXISTS schedule_steps (
                id TEXT PRIMARY KEY,
                schedule_id TEXT NOT NULL REFERENCES schedules(id) ON DELETE CASCADE,
                workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                duration INTEGER NOT NULL,
                position INTEGER NOT NULL DEFAULT 1
            )
            ",
            "schedule_steps",
        )
        .await
    }
}

/// Manager for schedules
pub struct ScheduleManager {
    pool: SqlitePool,
}

impl ScheduleManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a schedule, deactivating the user's other schedules when it is active
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn create_schedule(&self, schedule: &Schedule) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        if schedule.is_active {
            deactivate_others(&mut tx, schedule).await?;
        }

        sqlx::query(
            r"
            INSERT INTO schedules (id, user_id, name, start_date, is_active, is_loop)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(schedule.id.to_string())
        .bind(schedule.user_id.to_string())
        .bind(&schedule.name)
        .bind(format_date(schedule.start_date))
        .bind(schedule.is_active)
        .bind(schedule.is_loop)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create schedule: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit schedule: {e}")))
    }

    /// Save an edited schedule, deactivating the user's other schedules when it is active
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn update_schedule(&self, schedule: &Schedule) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        if schedule.is_active {
            deactivate_others(&mut tx, schedule).await?;
        }

        sqlx::query(
            "UPDATE schedules SET name = $1, start_date = $2, is_active = $3, is_loop = $4 WHERE id = $5",
        )
        .bind(&schedule.name)
        .bind(format_date(schedule.start_date))
        .bind(schedule.is_active)
        .bind(schedule.is_loop)
        .bind(schedule.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update schedule: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit schedule: {e}")))
    }

    /// Get a schedule
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_schedule(&self, id: Uuid) -> AppResult<Option<Schedule>> {
        let row = sqlx::query("SELECT * FROM schedules WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get schedule: {e}")))?;
        row.as_ref().map(row_to_schedule).transpose()
    }

    /// A user's schedules
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_schedules(&self, user_id: Uuid) -> AppResult<Vec<Schedule>> {
        let rows = sqlx::query(
            "SELECT * FROM schedules WHERE user_id = $1 ORDER BY start_date DESC, rowid DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list schedules: {e}")))?;
        rows.iter().map(row_to_schedule).collect()
    }

    /// Delete a schedule with its steps
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_schedule(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete schedule: {e}")))?;
        Ok(())
    }

    /// The user's active schedule with its steps
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn active_schedule(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<(Schedule, Vec<ScheduleStep>)>> {
        let row = sqlx::query(
            "SELECT * FROM schedules WHERE user_id = $1 AND is_active = 1 LIMIT 1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get active schedule: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let schedule = row_to_schedule(&row)?;
        let steps = self.list_steps(schedule.id).await?;
        Ok(Some((schedule, steps)))
    }

    /// Insert a step
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_step(&self, step: &ScheduleStep) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO schedule_steps (id, schedule_id, workout_id, duration, position) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(step.id.to_string())
        .bind(step.schedule_id.to_string())
        .bind(step.workout_id.to_string())
        .bind(i64::from(step.duration))
        .bind(i64::from(step.order))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create schedule step: {e}")))?;
        Ok(())
    }

    /// Get a step
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_step(&self, id: Uuid) -> AppResult<Option<ScheduleStep>> {
        let row = sqlx::query("SELECT * FROM schedule_steps WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get schedule step: {e}")))?;
        row.as_ref().map(row_to_step).transpose()
    }

    /// Steps of a schedule in order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_steps(&self, schedule_id: Uuid) -> AppResult<Vec<ScheduleStep>> {
        let rows = sqlx::query(
            "SELECT * FROM schedule_steps WHERE schedule_id = $1 ORDER BY position, rowid",
        )
        .bind(schedule_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list schedule steps: {e}")))?;
        rows.iter().map(row_to_step).collect()
    }

    /// Next free position in a schedule
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn next_step_order(&self, schedule_id: Uuid) -> AppResult<u32> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(position), 0) + 1 AS next FROM schedule_steps WHERE schedule_id = $1",
        )
        .bind(schedule_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to compute step order: {e}")))?;
        Ok(get_u32(&row, "next"))
    }

    /// Save an edited step
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_step(&self, step: &ScheduleStep) -> AppResult<()> {
        sqlx::query(
            "UPDATE schedule_steps SET workout_id = $1, duration = $2, position = $3 WHERE id = $4",
        )
        .bind(step.workout_id.to_string())
        .bind(i64::from(step.duration))
        .bind(i64::from(step.order))
        .bind(step.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update schedule step: {e}")))?;
        Ok(())
    }

    /// Delete a step
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_step(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM schedule_steps WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete schedule step: {e}")))?;
        Ok(())
    }
}

async fn deactivate_others(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    schedule: &Schedule,
) -> AppResult<()> {
    sqlx::query("UPDATE schedules SET is_active = 0 WHERE user_id = $1 AND id != $2")
        .bind(schedule.user_id.to_string())
        .bind(schedule.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to deactivate schedules: {e}")))?;
    Ok(())
}

fn row_to_schedule(row: &SqliteRow) -> AppResult<Schedule> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let start_date: String = row.get("start_date");
    Ok(Schedule {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        name: row.get("name"),
        start_date: parse_date(&start_date)?,
        is_active: row.get("is_active"),
        is_loop: row.get("is_loop"),
    })
}

fn row_to_step(row: &SqliteRow) -> AppResult<ScheduleStep> {
    let id: String = row.get("id");
    let schedule_id: String = row.get("schedule_id");
    let workout_id: String = row.get("workout_id");
    Ok(ScheduleStep {
        id: parse_uuid(&id)?,
        schedule_id: parse_uuid(&schedule_id)?,
        workout_id: parse_uuid(&workout_id)?,
        duration: get_u32(row, "duration"),
        order: get_u32(row, "position"),
    })
}
