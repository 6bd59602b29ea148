// ABOUTME: Database operations for workout logs and training sessions
// ABOUTME: Records performed repetitions, per-day sessions, the training calendar and last activity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{
    execute_schema, format_date, format_time, get_u32, parse_date, parse_optional_date,
    parse_optional_time, parse_uuid, Database,
};
use crate::errors::{map_unique_violation, AppError, AppResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::BTreeMap;
use uuid::Uuid;
use workout_core::models::{Impression, WorkoutLog, WorkoutSession};

/// One calendar day with training activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    /// Date
    pub date: NaiveDate,
    /// Logged exercises
    pub logs: Vec<WorkoutLog>,
    /// Session record of the day
    pub session: Option<WorkoutSession>,
}

impl Database {
    pub(super) async fn migrate_logs(&self) -> AppResult<()> {
        let pool = self.pool();
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS workout_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                reps INTEGER NOT NULL,
                weight REAL NOT NULL,
                rir REAL,
                date TEXT NOT NULL
            )
            ",
            "workout_logs",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS workout_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                impression TEXT NOT NULL DEFAULT 'neutral',
                time_start TEXT,
                time_end TEXT,
                UNIQUE (user_id, date)
            )
            ",
            "workout_sessions",
        )
        .await?;
        execute_schema(
            pool,
            "CREATE INDEX IF NOT EXISTS idx_workout_logs_user_date ON workout_logs(user_id, date)",
            "idx_workout_logs_user_date",
        )
        .await
    }
}

/// Manager for logs and sessions
pub struct WorkoutLogManager {
    pool: SqlitePool,
}

impl WorkoutLogManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a log entry
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_log(&self, log: &WorkoutLog) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO workout_logs (id, user_id, workout_id, exercise_id, reps, weight, rir, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(log.id.to_string())
        .bind(log.user_id.to_string())
        .bind(log.workout_id.to_string())
        .bind(log.exercise_id.to_string())
        .bind(i64::from(log.reps))
        .bind(log.weight)
        .bind(log.rir)
        .bind(format_date(log.date))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout log: {e}")))?;
        Ok(())
    }

    /// Get a log entry
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_log(&self, id: Uuid) -> AppResult<Option<WorkoutLog>> {
        let row = sqlx::query("SELECT * FROM workout_logs WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get workout log: {e}")))?;
        row.as_ref().map(row_to_log).transpose()
    }

    /// A user's logs, newest first, optionally limited to a workout or exercise
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_logs(
        &self,
        user_id: Uuid,
        workout_id: Option<Uuid>,
        exercise_id: Option<Uuid>,
    ) -> AppResult<Vec<WorkoutLog>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM workout_logs
            WHERE user_id = $1
              AND ($2 IS NULL OR workout_id = $2)
              AND ($3 IS NULL OR exercise_id = $3)
            ORDER BY date DESC, rowid
            ",
        )
        .bind(user_id.to_string())
        .bind(workout_id.map(|id| id.to_string()))
        .bind(exercise_id.map(|id| id.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout logs: {e}")))?;
        rows.iter().map(row_to_log).collect()
    }

    /// Save an edited log entry
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_log(&self, log: &WorkoutLog) -> AppResult<()> {
        sqlx::query(
            "UPDATE workout_logs SET reps = $1, weight = $2, rir = $3, date = $4 WHERE id = $5",
        )
        .bind(i64::from(log.reps))
        .bind(log.weight)
        .bind(log.rir)
        .bind(format_date(log.date))
        .bind(log.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update workout log: {e}")))?;
        Ok(())
    }

    /// Delete a log entry
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_log(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM workout_logs WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout log: {e}")))?;
        Ok(())
    }

    /// Insert a session, one per user and date
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the date already has a session
    pub async fn create_session(&self, session: &WorkoutSession) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO workout_sessions (id, user_id, workout_id, date, notes, impression, time_start, time_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(session.workout_id.to_string())
        .bind(format_date(session.date))
        .bind(&session.notes)
        .bind(session.impression.as_str())
        .bind(format_time(session.time_start))
        .bind(format_time(session.time_end))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                "A session for this date already exists",
                "Failed to create session",
            )
        })?;
        Ok(())
    }

    /// Get a session
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_session(&self, id: Uuid) -> AppResult<Option<WorkoutSession>> {
        let row = sqlx::query("SELECT * FROM workout_sessions WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get session: {e}")))?;
        row.as_ref().map(row_to_session).transpose()
    }

    /// A user's sessions, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_sessions(&self, user_id: Uuid) -> AppResult<Vec<WorkoutSession>> {
        let rows = sqlx::query(
            "SELECT * FROM workout_sessions WHERE user_id = $1 ORDER BY date DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list sessions: {e}")))?;
        rows.iter().map(row_to_session).collect()
    }

    /// Save an edited session
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when moved onto a date with a session
    pub async fn update_session(&self, session: &WorkoutSession) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE workout_sessions
            SET workout_id = $1, date = $2, notes = $3, impression = $4, time_start = $5, time_end = $6
            WHERE id = $7
            ",
        )
        .bind(session.workout_id.to_string())
        .bind(format_date(session.date))
        .bind(&session.notes)
        .bind(session.impression.as_str())
        .bind(format_time(session.time_start))
        .bind(format_time(session.time_end))
        .bind(session.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                "A session for this date already exists",
                "Failed to update session",
            )
        })?;
        Ok(())
    }

    /// Delete a session
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_session(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM workout_sessions WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete session: {e}")))?;
        Ok(())
    }

    /// Days of a month with logs or a session
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an impossible month, or a database error
    pub async fn calendar(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<CalendarDay>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::invalid_input(format!("Invalid month {year}-{month}")))?;
        let next = if first.month() == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| AppError::invalid_input(format!("Invalid month {year}-{month}")))?;

        let log_rows = sqlx::query(
            "SELECT * FROM workout_logs WHERE user_id = $1 AND date >= $2 AND date < $3 ORDER BY date, rowid",
        )
        .bind(user_id.to_string())
        .bind(format_date(first))
        .bind(format_date(next))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load calendar logs: {e}")))?;

        let session_rows = sqlx::query(
            "SELECT * FROM workout_sessions WHERE user_id = $1 AND date >= $2 AND date < $3",
        )
        .bind(user_id.to_string())
        .bind(format_date(first))
        .bind(format_date(next))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load calendar sessions: {e}")))?;

        let mut days: BTreeMap<NaiveDate, CalendarDay> = BTreeMap::new();
        for row in &log_rows {
            let log = row_to_log(row)?;
            let date = log.date;
            days.entry(date)
                .or_insert_with(|| CalendarDay {
                    date,
                    logs: Vec::new(),
                    session: None,
                })
                .logs
                .push(log);
        }
        for row in &session_rows {
            let session = row_to_session(row)?;
            let date = session.date;
            days.entry(date)
                .or_insert_with(|| CalendarDay {
                    date,
                    logs: Vec::new(),
                    session: None,
                })
                .session = Some(session);
        }

        Ok(days.into_values().collect())
    }

    /// Most recent log or session date
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn last_activity(&self, user_id: Uuid) -> AppResult<Option<NaiveDate>> {
        let row = sqlx::query(
            r"
            SELECT MAX(last) AS last FROM (
                SELECT MAX(date) AS last FROM workout_logs WHERE user_id = $1
                UNION ALL
                SELECT MAX(date) AS last FROM workout_sessions WHERE user_id = $1
            )
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load last activity: {e}")))?;
        parse_optional_date(row.get("last"))
    }
}

fn row_to_log(row: &SqliteRow) -> AppResult<WorkoutLog> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let workout_id: String = row.get("workout_id");
    let exercise_id: String = row.get("exercise_id");
    let date: String = row.get("date");
    Ok(WorkoutLog {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        workout_id: parse_uuid(&workout_id)?,
        exercise_id: parse_uuid(&exercise_id)?,
        reps: get_u32(row, "reps"),
        weight: row.get("weight"),
        rir: row.get("rir"),
        date: parse_date(&date)?,
    })
}

fn row_to_session(row: &SqliteRow) -> AppResult<WorkoutSession> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let workout_id: String = row.get("workout_id");
    let date: String = row.get("date");
    let impression: String = row.get("impression");
    Ok(WorkoutSession {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        workout_id: parse_uuid(&workout_id)?,
        date: parse_date(&date)?,
        notes: row.get("notes"),
        impression: Impression::parse(&impression),
        time_start: parse_optional_time(row.get("time_start"))?,
        time_end: parse_optional_time(row.get("time_end"))?,
    })
}
