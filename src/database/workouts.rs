// ABOUTME: Database operations for workout routines
// ABOUTME: Workouts, training days, exercise sets and repetition settings, plus deep copies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{
    execute_schema, format_date, from_json, get_u32, parse_date, parse_uuid, to_json, Database,
};
use super::exercises::ExerciseManager;
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;
use workout_core::models::{Day, DayOfWeek, ExerciseSet, Setting, Workout};
use workout_core::routine::WorkoutComponents;

impl Database {
    pub(super) async fn migrate_workouts(&self) -> AppResult<()> {
        let pool = self.pool();
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS workouts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL
            )
            ",
            "workouts",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS workout_days (
                id TEXT PRIMARY KEY,
                workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                description TEXT NOT NULL,
                days_of_week TEXT NOT NULL
            )
            ",
            "workout_days",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS workout_sets (
                id TEXT PRIMARY KEY,
                day_id TEXT NOT NULL REFERENCES workout_days(id) ON DELETE CASCADE,
                position INTEGER NOT NULL DEFAULT 1,
                sets INTEGER NOT NULL DEFAULT 4,
                exercises TEXT NOT NULL DEFAULT '[]'
            )
            ",
            "workout_sets",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS workout_settings (
                id TEXT PRIMARY KEY,
                set_id TEXT NOT NULL REFERENCES workout_sets(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                reps INTEGER NOT NULL,
                weight REAL,
                rir REAL,
                position INTEGER NOT NULL DEFAULT 1,
                comment TEXT NOT NULL DEFAULT ''
            )
            ",
            "workout_settings",
        )
        .await?;
        execute_schema(
            pool,
            "CREATE INDEX IF NOT EXISTS idx_workouts_user ON workouts(user_id)",
            "idx_workouts_user",
        )
        .await
    }
}

/// Manager for workouts and their nested rows
pub struct WorkoutManager {
    pool: SqlitePool,
}

impl WorkoutManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a workout dated today
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_workout(&self, user_id: Uuid, name: &str) -> AppResult<Workout> {
        let workout = Workout {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_owned(),
            created: Utc::now().date_naive(),
        };
        insert_workout(&self.pool, &workout).await?;
        Ok(workout)
    }

    /// Insert a fully specified workout
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn insert_workout(&self, workout: &Workout) -> AppResult<()> {
        insert_workout(&self.pool, workout).await
    }

    /// Get a workout by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_workout(&self, id: Uuid) -> AppResult<Option<Workout>> {
        let row = sqlx::query("SELECT * FROM workouts WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get workout: {e}")))?;
        row.as_ref().map(row_to_workout).transpose()
    }

    /// A user's workouts, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_workouts(&self, user_id: Uuid) -> AppResult<Vec<Workout>> {
        let rows = sqlx::query(
            "SELECT * FROM workouts WHERE user_id = $1 ORDER BY created DESC, rowid DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workouts: {e}")))?;
        rows.iter().map(row_to_workout).collect()
    }

    /// Rename a workout
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn rename_workout(&self, id: Uuid, name: &str) -> AppResult<()> {
        sqlx::query("UPDATE workouts SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update workout: {e}")))?;
        Ok(())
    }

    /// Delete a workout with its days, sets and settings
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_workout(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout: {e}")))?;
        Ok(())
    }

    /// Add a training day
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_day(&self, day: &Day) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO workout_days (id, workout_id, description, days_of_week) VALUES ($1, $2, $3, $4)",
        )
        .bind(day.id.to_string())
        .bind(day.workout_id.to_string())
        .bind(&day.description)
        .bind(days_to_json(&day.days_of_week)?)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create day: {e}")))?;
        Ok(())
    }

    /// Get a training day
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_day(&self, id: Uuid) -> AppResult<Option<Day>> {
        let row = sqlx::query("SELECT * FROM workout_days WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get day: {e}")))?;
        row.as_ref().map(row_to_day).transpose()
    }

    /// Days of a workout in creation order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_days(&self, workout_id: Uuid) -> AppResult<Vec<Day>> {
        let rows = sqlx::query("SELECT * FROM workout_days WHERE workout_id = $1 ORDER BY rowid")
            .bind(workout_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list days: {e}")))?;
        rows.iter().map(row_to_day).collect()
    }

    /// Save an edited day
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_day(&self, day: &Day) -> AppResult<()> {
        sqlx::query("UPDATE workout_days SET description = $1, days_of_week = $2 WHERE id = $3")
            .bind(&day.description)
            .bind(days_to_json(&day.days_of_week)?)
            .bind(day.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update day: {e}")))?;
        Ok(())
    }

    /// Delete a day with its sets
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_day(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM workout_days WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete day: {e}")))?;
        Ok(())
    }

    /// Add an exercise set
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_set(&self, set: &ExerciseSet) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO workout_sets (id, day_id, position, sets, exercises) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(set.id.to_string())
        .bind(set.day_id.to_string())
        .bind(i64::from(set.order))
        .bind(i64::from(set.sets))
        .bind(to_json(&set.exercises)?)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create set: {e}")))?;
        Ok(())
    }

    /// Get an exercise set
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_set(&self, id: Uuid) -> AppResult<Option<ExerciseSet>> {
        let row = sqlx::query("SELECT * FROM workout_sets WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get set: {e}")))?;
        row.as_ref().map(row_to_set).transpose()
    }

    /// Sets of every day of a workout
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_sets(&self, workout_id: Uuid) -> AppResult<Vec<ExerciseSet>> {
        let rows = sqlx::query(
            r"
            SELECT s.* FROM workout_sets s
            JOIN workout_days d ON d.id = s.day_id
            WHERE d.workout_id = $1
            ORDER BY s.position, s.rowid
            ",
        )
        .bind(workout_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list sets: {e}")))?;
        rows.iter().map(row_to_set).collect()
    }

    /// Next free position within a day
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn next_set_order(&self, day_id: Uuid) -> AppResult<u32> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(position), 0) + 1 AS next FROM workout_sets WHERE day_id = $1",
        )
        .bind(day_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to compute set order: {e}")))?;
        Ok(get_u32(&row, "next"))
    }

    /// Save an edited set
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_set(&self, set: &ExerciseSet) -> AppResult<()> {
        sqlx::query(
            "UPDATE workout_sets SET position = $1, sets = $2, exercises = $3 WHERE id = $4",
        )
        .bind(i64::from(set.order))
        .bind(i64::from(set.sets))
        .bind(to_json(&set.exercises)?)
        .bind(set.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update set: {e}")))?;
        Ok(())
    }

    /// Delete a set with its settings
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_set(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM workout_sets WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete set: {e}")))?;
        Ok(())
    }

    /// Drop settings whose exercise was removed from the set
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn prune_settings(&self, set: &ExerciseSet) -> AppResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM workout_settings
            WHERE set_id = $1 AND exercise_id NOT IN (SELECT value FROM json_each($2))
            ",
        )
        .bind(set.id.to_string())
        .bind(to_json(&set.exercises)?)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to prune settings: {e}")))?;
        Ok(result.rows_affected())
    }

    /// Add a repetition setting
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_setting(&self, setting: &Setting) -> AppResult<()> {
        insert_setting(&self.pool, setting).await
    }

    /// Get a setting
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_setting(&self, id: Uuid) -> AppResult<Option<Setting>> {
        let row = sqlx::query("SELECT * FROM workout_settings WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get setting: {e}")))?;
        row.as_ref().map(row_to_setting).transpose()
    }

    /// Settings of every set of a workout
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_settings(&self, workout_id: Uuid) -> AppResult<Vec<Setting>> {
        let rows = sqlx::query(
            r"
            SELECT st.* FROM workout_settings st
            JOIN workout_sets s ON s.id = st.set_id
            JOIN workout_days d ON d.id = s.day_id
            WHERE d.workout_id = $1
            ORDER BY st.position, st.rowid
            ",
        )
        .bind(workout_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list settings: {e}")))?;
        rows.iter().map(row_to_setting).collect()
    }

    /// Save an edited setting
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_setting(&self, setting: &Setting) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE workout_settings
            SET reps = $1, weight = $2, rir = $3, position = $4, comment = $5
            WHERE id = $6
            ",
        )
        .bind(i64::from(setting.reps))
        .bind(setting.weight)
        .bind(setting.rir)
        .bind(i64::from(setting.order))
        .bind(&setting.comment)
        .bind(setting.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update setting: {e}")))?;
        Ok(())
    }

    /// Delete a setting
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_setting(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM workout_settings WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete setting: {e}")))?;
        Ok(())
    }

    /// Load every row needed for the canonical representation
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn load_components(
        &self,
        workout_id: Uuid,
        exercises: &ExerciseManager,
    ) -> AppResult<WorkoutComponents> {
        let days = self.list_days(workout_id).await?;
        let sets = self.list_sets(workout_id).await?;
        let settings = self.list_settings(workout_id).await?;

        let mut exercise_ids: Vec<Uuid> = sets
            .iter()
            .flat_map(|s| s.exercises.iter().copied())
            .collect();
        exercise_ids.sort_unstable();
        exercise_ids.dedup();

        Ok(WorkoutComponents {
            days,
            sets,
            settings,
            exercises: exercises.exercises_by_id(&exercise_ids).await?,
            muscles: exercises.muscles_by_id().await?,
        })
    }

    /// Copy a workout with all days, sets and settings to `owner`
    ///
    /// Runs in one transaction; the copy is dated today.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown workout, or a database error
    pub async fn copy_workout(
        &self,
        workout_id: Uuid,
        owner: Uuid,
        name: Option<&str>,
    ) -> AppResult<Workout> {
        let source = self
            .get_workout(workout_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;
        let days = self.list_days(workout_id).await?;
        let sets = self.list_sets(workout_id).await?;
        let settings = self.list_settings(workout_id).await?;

        let copy = Workout {
            id: Uuid::new_v4(),
            user_id: owner,
            name: name.map_or_else(|| source.name.clone(), str::to_owned),
            created: Utc::now().date_naive(),
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        insert_workout(&mut *tx, &copy).await?;

        let mut day_ids = HashMap::new();
        for day in &days {
            let new_id = Uuid::new_v4();
            day_ids.insert(day.id, new_id);
            sqlx::query(
                "INSERT INTO workout_days (id, workout_id, description, days_of_week) VALUES ($1, $2, $3, $4)",
            )
            .bind(new_id.to_string())
            .bind(copy.id.to_string())
            .bind(&day.description)
            .bind(days_to_json(&day.days_of_week)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to copy day: {e}")))?;
        }

        let mut set_ids = HashMap::new();
        for set in &sets {
            let Some(day_id) = day_ids.get(&set.day_id) else {
                continue;
            };
            let new_id = Uuid::new_v4();
            set_ids.insert(set.id, new_id);
            sqlx::query(
                "INSERT INTO workout_sets (id, day_id, position, sets, exercises) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(new_id.to_string())
            .bind(day_id.to_string())
            .bind(i64::from(set.order))
            .bind(i64::from(set.sets))
            .bind(to_json(&set.exercises)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to copy set: {e}")))?;
        }

        for setting in &settings {
            let Some(set_id) = set_ids.get(&setting.set_id) else {
                continue;
            };
            let copied = Setting {
                id: Uuid::new_v4(),
                set_id: *set_id,
                ..setting.clone()
            };
            insert_setting(&mut *tx, &copied).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit workout copy: {e}")))?;

        Ok(copy)
    }
}

async fn insert_workout<'e, E>(executor: E, workout: &Workout) -> AppResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query("INSERT INTO workouts (id, user_id, name, created) VALUES ($1, $2, $3, $4)")
        .bind(workout.id.to_string())
        .bind(workout.user_id.to_string())
        .bind(&workout.name)
        .bind(format_date(workout.created))
        .execute(executor)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout: {e}")))?;
    Ok(())
}

async fn insert_setting<'e, E>(executor: E, setting: &Setting) -> AppResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r"
        INSERT INTO workout_settings (id, set_id, exercise_id, reps, weight, rir, position, comment)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(setting.id.to_string())
    .bind(setting.set_id.to_string())
    .bind(setting.exercise_id.to_string())
    .bind(i64::from(setting.reps))
    .bind(setting.weight)
    .bind(setting.rir)
    .bind(i64::from(setting.order))
    .bind(&setting.comment)
    .execute(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to create setting: {e}")))?;
    Ok(())
}

fn days_to_json(days: &[DayOfWeek]) -> AppResult<String> {
    let numbers: Vec<u8> = days.iter().map(|d| d.number()).collect();
    to_json(&numbers)
}

fn row_to_workout(row: &SqliteRow) -> AppResult<Workout> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created: String = row.get("created");
    Ok(Workout {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        name: row.get("name"),
        created: parse_date(&created)?,
    })
}

fn row_to_day(row: &SqliteRow) -> AppResult<Day> {
    let id: String = row.get("id");
    let workout_id: String = row.get("workout_id");
    let days: String = row.get("days_of_week");
    let numbers: Vec<u8> = from_json(&days)?;
    let days_of_week = numbers
        .into_iter()
        .map(|n| {
            DayOfWeek::try_from(n)
                .map_err(|e| AppError::internal(format!("Invalid weekday: {e}")))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Day {
        id: parse_uuid(&id)?,
        workout_id: parse_uuid(&workout_id)?,
        description: row.get("description"),
        days_of_week,
    })
}

fn row_to_set(row: &SqliteRow) -> AppResult<ExerciseSet> {
    let id: String = row.get("id");
    let day_id: String = row.get("day_id");
    let exercises: String = row.get("exercises");
    Ok(ExerciseSet {
        id: parse_uuid(&id)?,
        day_id: parse_uuid(&day_id)?,
        order: get_u32(row, "position"),
        sets: get_u32(row, "sets"),
        exercises: from_json(&exercises)?,
    })
}

fn row_to_setting(row: &SqliteRow) -> AppResult<Setting> {
    let id: String = row.get("id");
    let set_id: String = row.get("set_id");
    let exercise_id: String = row.get("exercise_id");
    Ok(Setting {
        id: parse_uuid(&id)?,
        set_id: parse_uuid(&set_id)?,
        exercise_id: parse_uuid(&exercise_id)?,
        reps: get_u32(row, "reps"),
        weight: row.get("weight"),
        rir: row.get("rir"),
        order: get_u32(row, "position"),
        comment: row.get("comment"),
    })
}
