// ABOUTME: Database operations for the exercise catalogue
// ABOUTME: Languages, categories, muscles, equipment, exercises with moderation, and comments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{
    execute_schema, from_json, parse_optional_uuid, parse_timestamp, parse_uuid, to_json, Database,
};
use crate::errors::{map_unique_violation, AppError, AppResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;
use workout_core::models::{
    Equipment, Exercise, ExerciseCategory, ExerciseComment, Language, ModerationStatus, Muscle,
};

/// Short name of the language seeded on first start
pub const DEFAULT_LANGUAGE: &str = "en";

/// Filters for listing exercises
#[derive(Debug, Clone, Default)]
pub struct ExerciseFilter {
    /// Only exercises in this review state
    pub status: Option<ModerationStatus>,
    /// Only exercises of this category
    pub category_id: Option<Uuid>,
    /// Only exercises in this language
    pub language_id: Option<Uuid>,
    /// Case-insensitive name fragment
    pub search: Option<String>,
}

impl Database {
    pub(super) async fn migrate_exercises(&self) -> AppResult<()> {
        let pool = self.pool();
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS languages (
                id TEXT PRIMARY KEY,
                short_name TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL
            )
            ",
            "languages",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS exercise_categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            )
            ",
            "exercise_categories",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS muscles (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                is_front INTEGER NOT NULL DEFAULT 1
            )
            ",
            "muscles",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS equipment (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            )
            ",
            "equipment",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category_id TEXT NOT NULL REFERENCES exercise_categories(id),
                language_id TEXT NOT NULL REFERENCES languages(id),
                muscles TEXT NOT NULL DEFAULT '[]',
                muscles_secondary TEXT NOT NULL DEFAULT '[]',
                equipment TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL DEFAULT 'pending',
                license_author TEXT,
                author_id TEXT REFERENCES users(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL
            )
            ",
            "exercises",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS exercise_comments (
                id TEXT PRIMARY KEY,
                exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                comment TEXT NOT NULL
            )
            ",
            "exercise_comments",
        )
        .await?;

        sqlx::query(
            "INSERT OR IGNORE INTO languages (id, short_name, full_name) VALUES ($1, $2, $3)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(DEFAULT_LANGUAGE)
        .bind("English")
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to seed languages: {e}")))?;
        Ok(())
    }
}

/// Manager for the exercise catalogue
pub struct ExerciseManager {
    pool: SqlitePool,
}

impl ExerciseManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All languages
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        let rows = sqlx::query("SELECT * FROM languages ORDER BY short_name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list languages: {e}")))?;
        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                Ok(Language {
                    id: parse_uuid(&id)?,
                    short_name: row.get("short_name"),
                    full_name: row.get("full_name"),
                })
            })
            .collect()
    }

    /// Language by short name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_language_by_short_name(
        &self,
        short_name: &str,
    ) -> AppResult<Option<Language>> {
        Ok(self
            .list_languages()
            .await?
            .into_iter()
            .find(|l| l.short_name == short_name))
    }

    /// The seeded default language
    ///
    /// # Errors
    ///
    /// Returns an internal error if the seed row is missing
    pub async fn default_language(&self) -> AppResult<Language> {
        self.get_language_by_short_name(DEFAULT_LANGUAGE)
            .await?
            .ok_or_else(|| AppError::internal("Default language is missing"))
    }

    /// Add a language
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` for a duplicate short name
    pub async fn create_language(&self, short_name: &str, full_name: &str) -> AppResult<Language> {
        let language = Language {
            id: Uuid::new_v4(),
            short_name: short_name.to_owned(),
            full_name: full_name.to_owned(),
        };
        sqlx::query("INSERT INTO languages (id, short_name, full_name) VALUES ($1, $2, $3)")
            .bind(language.id.to_string())
            .bind(&language.short_name)
            .bind(&language.full_name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, "Language already exists", "Failed to create language")
            })?;
        Ok(language)
    }

    /// All categories
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_categories(&self) -> AppResult<Vec<ExerciseCategory>> {
        let rows = sqlx::query("SELECT * FROM exercise_categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list categories: {e}")))?;
        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                Ok(ExerciseCategory {
                    id: parse_uuid(&id)?,
                    name: row.get("name"),
                })
            })
            .collect()
    }

    /// Add a category
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` for a duplicate name
    pub async fn create_category(&self, name: &str) -> AppResult<ExerciseCategory> {
        let category = ExerciseCategory {
            id: Uuid::new_v4(),
            name: name.to_owned(),
        };
        sqlx::query("INSERT INTO exercise_categories (id, name) VALUES ($1, $2)")
            .bind(category.id.to_string())
            .bind(&category.name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, "Category already exists", "Failed to create category")
            })?;
        Ok(category)
    }

    /// All muscles
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_muscles(&self) -> AppResult<Vec<Muscle>> {
        let rows = sqlx::query("SELECT * FROM muscles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list muscles: {e}")))?;
        rows.iter().map(row_to_muscle).collect()
    }

    /// Muscles keyed by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn muscles_by_id(&self) -> AppResult<HashMap<Uuid, Muscle>> {
        Ok(self
            .list_muscles()
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect())
    }

    /// Add a muscle
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` for a duplicate name
    pub async fn create_muscle(&self, name: &str, is_front: bool) -> AppResult<Muscle> {
        let muscle = Muscle {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            is_front,
        };
        sqlx::query("INSERT INTO muscles (id, name, is_front) VALUES ($1, $2, $3)")
            .bind(muscle.id.to_string())
            .bind(&muscle.name)
            .bind(muscle.is_front)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, "Muscle already exists", "Failed to create muscle")
            })?;
        Ok(muscle)
    }

    /// All equipment
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query("SELECT * FROM equipment ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list equipment: {e}")))?;
        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                Ok(Equipment {
                    id: parse_uuid(&id)?,
                    name: row.get("name"),
                })
            })
            .collect()
    }

    /// Add equipment
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` for a duplicate name
    pub async fn create_equipment(&self, name: &str) -> AppResult<Equipment> {
        let equipment = Equipment {
            id: Uuid::new_v4(),
            name: name.to_owned(),
        };
        sqlx::query("INSERT INTO equipment (id, name) VALUES ($1, $2)")
            .bind(equipment.id.to_string())
            .bind(&equipment.name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, "Equipment already exists", "Failed to create equipment")
            })?;
        Ok(equipment)
    }

    /// List exercises matching the filter
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_exercises(&self, filter: &ExerciseFilter) -> AppResult<Vec<Exercise>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM exercises
            WHERE ($1 IS NULL OR status = $1)
              AND ($2 IS NULL OR category_id = $2)
              AND ($3 IS NULL OR language_id = $3)
              AND ($4 IS NULL OR name LIKE '%' || $4 || '%')
            ORDER BY name
            ",
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.category_id.map(|id| id.to_string()))
        .bind(filter.language_id.map(|id| id.to_string()))
        .bind(filter.search.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list exercises: {e}")))?;
        rows.iter().map(row_to_exercise).collect()
    }

    /// Get an exercise by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_exercise(&self, id: Uuid) -> AppResult<Option<Exercise>> {
        let row = sqlx::query("SELECT * FROM exercises WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get exercise: {e}")))?;
        row.as_ref().map(row_to_exercise).transpose()
    }

    /// Exercises keyed by ID, unknown IDs are skipped
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn exercises_by_id(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Exercise>> {
        let rows = sqlx::query(
            "SELECT * FROM exercises WHERE id IN (SELECT value FROM json_each($1))",
        )
        .bind(to_json(ids)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load exercises: {e}")))?;
        rows.iter()
            .map(|row| row_to_exercise(row).map(|e| (e.id, e)))
            .collect()
    }

    /// Insert an exercise
    ///
    /// # Errors
    ///
    /// Returns a database error if the category or language does not exist
    pub async fn create_exercise(&self, exercise: &Exercise) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO exercises (
                id, name, description, category_id, language_id, muscles,
                muscles_secondary, equipment, status, license_author, author_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(exercise.id.to_string())
        .bind(&exercise.name)
        .bind(&exercise.description)
        .bind(exercise.category_id.to_string())
        .bind(exercise.language_id.to_string())
        .bind(to_json(&exercise.muscles)?)
        .bind(to_json(&exercise.muscles_secondary)?)
        .bind(to_json(&exercise.equipment)?)
        .bind(exercise.status.as_str())
        .bind(&exercise.license_author)
        .bind(exercise.author_id.map(|id| id.to_string()))
        .bind(exercise.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create exercise: {e}")))?;
        Ok(())
    }

    /// Save an edited exercise
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_exercise(&self, exercise: &Exercise) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE exercises SET
                name = $1, description = $2, category_id = $3, language_id = $4,
                muscles = $5, muscles_secondary = $6, equipment = $7, license_author = $8
            WHERE id = $9
            ",
        )
        .bind(&exercise.name)
        .bind(&exercise.description)
        .bind(exercise.category_id.to_string())
        .bind(exercise.language_id.to_string())
        .bind(to_json(&exercise.muscles)?)
        .bind(to_json(&exercise.muscles_secondary)?)
        .bind(to_json(&exercise.equipment)?)
        .bind(&exercise.license_author)
        .bind(exercise.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update exercise: {e}")))?;
        Ok(())
    }

    /// Accept or decline a submission
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown exercises
    pub async fn set_status(&self, id: Uuid, status: ModerationStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE exercises SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set exercise status: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Exercise"));
        }
        Ok(())
    }

    /// Delete an exercise
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown exercises
    pub async fn delete_exercise(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete exercise: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Exercise"));
        }
        Ok(())
    }

    /// Comments of an exercise
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_comments(&self, exercise_id: Uuid) -> AppResult<Vec<ExerciseComment>> {
        let rows = sqlx::query(
            "SELECT * FROM exercise_comments WHERE exercise_id = $1 ORDER BY rowid",
        )
        .bind(exercise_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list comments: {e}")))?;
        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let exercise_id: String = row.get("exercise_id");
                Ok(ExerciseComment {
                    id: parse_uuid(&id)?,
                    exercise_id: parse_uuid(&exercise_id)?,
                    comment: row.get("comment"),
                })
            })
            .collect()
    }

    /// Add a comment
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_comment(
        &self,
        exercise_id: Uuid,
        comment: &str,
    ) -> AppResult<ExerciseComment> {
        let comment = ExerciseComment {
            id: Uuid::new_v4(),
            exercise_id,
            comment: comment.to_owned(),
        };
        sqlx::query("INSERT INTO exercise_comments (id, exercise_id, comment) VALUES ($1, $2, $3)")
            .bind(comment.id.to_string())
            .bind(exercise_id.to_string())
            .bind(&comment.comment)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create comment: {e}")))?;
        Ok(comment)
    }

    /// Delete a comment of an exercise
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the comment does not belong to the exercise
    pub async fn delete_comment(&self, exercise_id: Uuid, comment_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM exercise_comments WHERE id = $1 AND exercise_id = $2")
            .bind(comment_id.to_string())
            .bind(exercise_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete comment: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Comment"));
        }
        Ok(())
    }
}

fn row_to_muscle(row: &SqliteRow) -> AppResult<Muscle> {
    let id: String = row.get("id");
    Ok(Muscle {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        is_front: row.get("is_front"),
    })
}

fn row_to_exercise(row: &SqliteRow) -> AppResult<Exercise> {
    let id: String = row.get("id");
    let category_id: String = row.get("category_id");
    let language_id: String = row.get("language_id");
    let muscles: String = row.get("muscles");
    let muscles_secondary: String = row.get("muscles_secondary");
    let equipment: String = row.get("equipment");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");

    Ok(Exercise {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        description: row.get("description"),
        category_id: parse_uuid(&category_id)?,
        language_id: parse_uuid(&language_id)?,
        muscles: from_json(&muscles)?,
        muscles_secondary: from_json(&muscles_secondary)?,
        equipment: from_json(&equipment)?,
        status: ModerationStatus::parse(&status),
        license_author: row.get("license_author"),
        author_id: parse_optional_uuid(row.get("author_id"))?,
        created_at: parse_timestamp(&created_at)?,
    })
}

