// ABOUTME: Database operations for ingredients and their weight units
// ABOUTME: Moderated ingredient catalogue plus the catalog loader used by nutrition aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{execute_schema, parse_optional_uuid, parse_timestamp, parse_uuid, to_json, Database};
use crate::errors::{map_reference_violation, map_unique_violation, AppError, AppResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;
use workout_core::models::{Ingredient, IngredientWeightUnit, ModerationStatus, WeightUnit};
use workout_core::nutrition::IngredientCatalog;

/// Default page size when listing ingredients
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Filters for listing ingredients
#[derive(Debug, Clone, Default)]
pub struct IngredientFilter {
    /// Only ingredients in this review state
    pub status: Option<ModerationStatus>,
    /// Only ingredients in this language
    pub language_id: Option<Uuid>,
    /// Case-insensitive name fragment
    pub search: Option<String>,
    /// Page size, [`DEFAULT_PAGE_SIZE`] when absent
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: Option<u32>,
}

impl Database {
    pub(super) async fn migrate_ingredients(&self) -> AppResult<()> {
        let pool = self.pool();
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS weight_units (
                id TEXT PRIMARY KEY,
                language_id TEXT NOT NULL REFERENCES languages(id),
                name TEXT NOT NULL,
                UNIQUE (language_id, name)
            )
            ",
            "weight_units",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id TEXT PRIMARY KEY,
                language_id TEXT NOT NULL REFERENCES languages(id),
                name TEXT NOT NULL,
                energy REAL NOT NULL,
                protein REAL NOT NULL,
                carbohydrates REAL NOT NULL,
                carbohydrates_sugar REAL,
                fat REAL NOT NULL,
                fat_saturated REAL,
                fibre REAL,
                sodium REAL,
                status TEXT NOT NULL DEFAULT 'pending',
                license_author TEXT,
                author_id TEXT REFERENCES users(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "ingredients",
        )
        .await?;
        execute_schema(
            pool,
            "CREATE INDEX IF NOT EXISTS idx_ingredients_name ON ingredients(name)",
            "idx_ingredients_name",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS ingredient_weight_units (
                id TEXT PRIMARY KEY,
                ingredient_id TEXT NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
                unit_id TEXT NOT NULL REFERENCES weight_units(id) ON DELETE CASCADE,
                gram REAL NOT NULL,
                amount REAL NOT NULL DEFAULT 1
            )
            ",
            "ingredient_weight_units",
        )
        .await
    }
}

/// Manager for ingredients and weight units
pub struct IngredientManager {
    pool: SqlitePool,
}

impl IngredientManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ================================================================================
    // Weight units
    // ================================================================================

    /// All weight units ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_weight_units(&self) -> AppResult<Vec<WeightUnit>> {
        let rows = sqlx::query("SELECT * FROM weight_units ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list weight units: {e}")))?;
        rows.iter().map(row_to_weight_unit).collect()
    }

    /// Get a weight unit
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_weight_unit(&self, id: Uuid) -> AppResult<Option<WeightUnit>> {
        let row = sqlx::query("SELECT * FROM weight_units WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get weight unit: {e}")))?;
        row.as_ref().map(row_to_weight_unit).transpose()
    }

    /// Create a weight unit
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the name is taken in that language
    pub async fn create_weight_unit(&self, language_id: Uuid, name: &str) -> AppResult<WeightUnit> {
        let unit = WeightUnit {
            id: Uuid::new_v4(),
            language_id,
            name: name.to_owned(),
        };
        sqlx::query("INSERT INTO weight_units (id, language_id, name) VALUES ($1, $2, $3)")
            .bind(unit.id.to_string())
            .bind(language_id.to_string())
            .bind(&unit.name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(
                    e,
                    "Weight unit already exists",
                    "Failed to create weight unit",
                )
            })?;
        Ok(unit)
    }

    /// Delete a weight unit and every ingredient conversion using it
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown units
    pub async fn delete_weight_unit(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM weight_units WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete weight unit: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Weight unit"));
        }
        Ok(())
    }

    // ================================================================================
    // Ingredients
    // ================================================================================

    /// One page of ingredients matching the filter
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_ingredients(&self, filter: &IngredientFilter) -> AppResult<Vec<Ingredient>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM ingredients
            WHERE ($1 IS NULL OR status = $1)
              AND ($2 IS NULL OR language_id = $2)
              AND ($3 IS NULL OR name LIKE '%' || $3 || '%')
            ORDER BY name
            LIMIT $4 OFFSET $5
            ",
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.language_id.map(|id| id.to_string()))
        .bind(filter.search.as_deref())
        .bind(i64::from(filter.limit.unwrap_or(DEFAULT_PAGE_SIZE)))
        .bind(i64::from(filter.offset.unwrap_or(0)))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list ingredients: {e}")))?;
        rows.iter().map(row_to_ingredient).collect()
    }

    /// Get an ingredient
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_ingredient(&self, id: Uuid) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query("SELECT * FROM ingredients WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;
        row.as_ref().map(row_to_ingredient).transpose()
    }

    /// Insert an ingredient
    ///
    /// # Errors
    ///
    /// Returns a database error if the language does not exist
    pub async fn create_ingredient(&self, ingredient: &Ingredient) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO ingredients (
                id, language_id, name, energy, protein, carbohydrates, carbohydrates_sugar,
                fat, fat_saturated, fibre, sodium, status, license_author, author_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ",
        )
        .bind(ingredient.id.to_string())
        .bind(ingredient.language_id.to_string())
        .bind(&ingredient.name)
        .bind(ingredient.energy)
        .bind(ingredient.protein)
        .bind(ingredient.carbohydrates)
        .bind(ingredient.carbohydrates_sugar)
        .bind(ingredient.fat)
        .bind(ingredient.fat_saturated)
        .bind(ingredient.fibre)
        .bind(ingredient.sodium)
        .bind(ingredient.status.as_str())
        .bind(&ingredient.license_author)
        .bind(ingredient.author_id.map(|id| id.to_string()))
        .bind(ingredient.created_at.to_rfc3339())
        .bind(ingredient.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create ingredient: {e}")))?;
        Ok(())
    }

    /// Save an edited ingredient
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_ingredient(&self, ingredient: &Ingredient) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE ingredients SET
                language_id = $1, name = $2, energy = $3, protein = $4, carbohydrates = $5,
                carbohydrates_sugar = $6, fat = $7, fat_saturated = $8, fibre = $9, sodium = $10,
                license_author = $11, updated_at = $12
            WHERE id = $13
            ",
        )
        .bind(ingredient.language_id.to_string())
        .bind(&ingredient.name)
        .bind(ingredient.energy)
        .bind(ingredient.protein)
        .bind(ingredient.carbohydrates)
        .bind(ingredient.carbohydrates_sugar)
        .bind(ingredient.fat)
        .bind(ingredient.fat_saturated)
        .bind(ingredient.fibre)
        .bind(ingredient.sodium)
        .bind(&ingredient.license_author)
        .bind(ingredient.updated_at.to_rfc3339())
        .bind(ingredient.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update ingredient: {e}")))?;
        Ok(())
    }

    /// Accept or decline a submitted ingredient
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown ingredients
    pub async fn set_status(&self, id: Uuid, status: ModerationStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE ingredients SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set ingredient status: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Ingredient"));
        }
        Ok(())
    }

    /// Delete an ingredient
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown ingredients, or `ResourceConflict`
    /// while meal items still reference it
    pub async fn delete_ingredient(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_reference_violation(
                    e,
                    "The ingredient is still used in nutrition plans",
                    "Failed to delete ingredient",
                )
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Ingredient"));
        }
        Ok(())
    }

    // ================================================================================
    // Ingredient weight units
    // ================================================================================

    /// Conversions defined for an ingredient
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_ingredient_units(
        &self,
        ingredient_id: Uuid,
    ) -> AppResult<Vec<IngredientWeightUnit>> {
        let rows = sqlx::query(
            "SELECT * FROM ingredient_weight_units WHERE ingredient_id = $1 ORDER BY rowid",
        )
        .bind(ingredient_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list ingredient units: {e}")))?;
        rows.iter().map(row_to_ingredient_unit).collect()
    }

    /// Get one conversion
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_ingredient_unit(&self, id: Uuid) -> AppResult<Option<IngredientWeightUnit>> {
        let row = sqlx::query("SELECT * FROM ingredient_weight_units WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get ingredient unit: {e}")))?;
        row.as_ref().map(row_to_ingredient_unit).transpose()
    }

    /// Insert a conversion
    ///
    /// # Errors
    ///
    /// Returns a database error if the ingredient or unit does not exist
    pub async fn create_ingredient_unit(&self, unit: &IngredientWeightUnit) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO ingredient_weight_units (id, ingredient_id, unit_id, gram, amount) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(unit.id.to_string())
        .bind(unit.ingredient_id.to_string())
        .bind(unit.unit_id.to_string())
        .bind(unit.gram)
        .bind(unit.amount)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create ingredient unit: {e}")))?;
        Ok(())
    }

    /// Save an edited conversion
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_ingredient_unit(&self, unit: &IngredientWeightUnit) -> AppResult<()> {
        sqlx::query(
            "UPDATE ingredient_weight_units SET unit_id = $1, gram = $2, amount = $3 WHERE id = $4",
        )
        .bind(unit.unit_id.to_string())
        .bind(unit.gram)
        .bind(unit.amount)
        .bind(unit.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update ingredient unit: {e}")))?;
        Ok(())
    }

    /// Delete a conversion
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_ingredient_unit(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM ingredient_weight_units WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete ingredient unit: {e}")))?;
        Ok(())
    }

    /// Load the ingredients and conversions needed to aggregate the given ingredients
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn load_catalog(&self, ingredient_ids: &[Uuid]) -> AppResult<IngredientCatalog> {
        let ids = to_json(ingredient_ids)?;

        let ingredient_rows = sqlx::query(
            "SELECT * FROM ingredients WHERE id IN (SELECT value FROM json_each($1))",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load ingredients: {e}")))?;

        let unit_rows = sqlx::query(
            "SELECT * FROM ingredient_weight_units WHERE ingredient_id IN (SELECT value FROM json_each($1))",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load ingredient units: {e}")))?;

        let ingredients = ingredient_rows
            .iter()
            .map(row_to_ingredient)
            .collect::<AppResult<Vec<_>>>()?;
        let units = unit_rows
            .iter()
            .map(row_to_ingredient_unit)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(IngredientCatalog::new(ingredients, units))
    }
}

fn row_to_weight_unit(row: &SqliteRow) -> AppResult<WeightUnit> {
    let id: String = row.get("id");
    let language_id: String = row.get("language_id");
    Ok(WeightUnit {
        id: parse_uuid(&id)?,
        language_id: parse_uuid(&language_id)?,
        name: row.get("name"),
    })
}

fn row_to_ingredient(row: &SqliteRow) -> AppResult<Ingredient> {
    let id: String = row.get("id");
    let language_id: String = row.get("language_id");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Ok(Ingredient {
        id: parse_uuid(&id)?,
        language_id: parse_uuid(&language_id)?,
        name: row.get("name"),
        energy: row.get("energy"),
        protein: row.get("protein"),
        carbohydrates: row.get("carbohydrates"),
        carbohydrates_sugar: row.get("carbohydrates_sugar"),
        fat: row.get("fat"),
        fat_saturated: row.get("fat_saturated"),
        fibre: row.get("fibre"),
        sodium: row.get("sodium"),
        status: ModerationStatus::parse(&status),
        license_author: row.get("license_author"),
        author_id: parse_optional_uuid(row.get("author_id"))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn row_to_ingredient_unit(row: &SqliteRow) -> AppResult<IngredientWeightUnit> {
    let id: String = row.get("id");
    let ingredient_id: String = row.get("ingredient_id");
    let unit_id: String = row.get("unit_id");
    Ok(IngredientWeightUnit {
        id: parse_uuid(&id)?,
        ingredient_id: parse_uuid(&ingredient_id)?,
        unit_id: parse_uuid(&unit_id)?,
        gram: row.get("gram"),
        amount: row.get("amount"),
    })
}
