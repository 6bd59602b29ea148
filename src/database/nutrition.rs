// ABOUTME: Database operations for nutrition plans, meals, meal items and the nutrition diary
// ABOUTME: Includes the transactional plan copy and the meal loader used for aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{
    execute_schema, format_date, format_time, get_u32, parse_date, parse_optional_time,
    parse_optional_uuid, parse_timestamp, parse_uuid, Database,
};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;
use workout_core::models::{Meal, MealItem, MealWithItems, NutritionLogItem, NutritionPlan};

impl Database {
    pub(super) async fn migrate_nutrition(&self) -> AppResult<()> {
        let pool = self.pool();
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS nutrition_plans (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                description TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                has_goal_calories INTEGER NOT NULL DEFAULT 0
            )
            ",
            "nutrition_plans",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS meals (
                id TEXT PRIMARY KEY,
                plan_id TEXT NOT NULL REFERENCES nutrition_plans(id) ON DELETE CASCADE,
                position INTEGER NOT NULL DEFAULT 1,
                time TEXT,
                name TEXT NOT NULL DEFAULT ''
            )
            ",
            "meals",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS meal_items (
                id TEXT PRIMARY KEY,
                meal_id TEXT NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
                ingredient_id TEXT NOT NULL REFERENCES ingredients(id),
                weight_unit_id TEXT REFERENCES ingredient_weight_units(id) ON DELETE SET NULL,
                position INTEGER NOT NULL DEFAULT 1,
                amount REAL NOT NULL
            )
            ",
            "meal_items",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS nutrition_log_items (
                id TEXT PRIMARY KEY,
                plan_id TEXT NOT NULL REFERENCES nutrition_plans(id) ON DELETE CASCADE,
                datetime TEXT NOT NULL,
                ingredient_id TEXT NOT NULL REFERENCES ingredients(id),
                weight_unit_id TEXT REFERENCES ingredient_weight_units(id) ON DELETE SET NULL,
                amount REAL NOT NULL
            )
            ",
            "nutrition_log_items",
        )
        .await?;
        execute_schema(
            pool,
            "CREATE INDEX IF NOT EXISTS idx_nutrition_plans_user ON nutrition_plans(user_id)",
            "idx_nutrition_plans_user",
        )
        .await
    }
}

/// Manager for nutrition plans and the diary
pub struct NutritionManager {
    pool: SqlitePool,
}

impl NutritionManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ================================================================================
    // Plans
    // ================================================================================

    /// Insert a plan
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_plan(&self, plan: &NutritionPlan) -> AppResult<()> {
        insert_plan(&self.pool, plan).await
    }

    /// Get a plan
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_plan(&self, id: Uuid) -> AppResult<Option<NutritionPlan>> {
        let row = sqlx::query("SELECT * FROM nutrition_plans WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get nutrition plan: {e}")))?;
        row.as_ref().map(row_to_plan).transpose()
    }

    /// A user's plans, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_plans(&self, user_id: Uuid) -> AppResult<Vec<NutritionPlan>> {
        let rows = sqlx::query(
            "SELECT * FROM nutrition_plans WHERE user_id = $1 ORDER BY created DESC, rowid DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list nutrition plans: {e}")))?;
        rows.iter().map(row_to_plan).collect()
    }

    /// Save an edited plan
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_plan(&self, plan: &NutritionPlan) -> AppResult<()> {
        sqlx::query(
            "UPDATE nutrition_plans SET description = $1, has_goal_calories = $2 WHERE id = $3",
        )
        .bind(&plan.description)
        .bind(plan.has_goal_calories)
        .bind(plan.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update nutrition plan: {e}")))?;
        Ok(())
    }

    /// Delete a plan with its meals, items and diary entries
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_plan(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM nutrition_plans WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete nutrition plan: {e}")))?;
        Ok(())
    }

    /// Copy a plan with its meals and items for `owner`
    ///
    /// Diary entries stay with the source plan.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the source plan does not exist, or a
    /// database error if the transaction fails
    pub async fn copy_plan(&self, plan_id: Uuid, owner: Uuid) -> AppResult<NutritionPlan> {
        let source = self
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Nutrition plan"))?;
        let meals = self.meals_with_items(plan_id).await?;

        let copy = NutritionPlan {
            id: Uuid::new_v4(),
            user_id: owner,
            created: Utc::now().date_naive(),
            ..source
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        insert_plan(&mut *tx, &copy).await?;

        let mut meal_ids = HashMap::new();
        for entry in &meals {
            let meal = Meal {
                id: Uuid::new_v4(),
                plan_id: copy.id,
                ..entry.meal.clone()
            };
            meal_ids.insert(entry.meal.id, meal.id);
            insert_meal(&mut *tx, &meal).await?;
        }

        for entry in &meals {
            let Some(meal_id) = meal_ids.get(&entry.meal.id) else {
                continue;
            };
            for item in &entry.items {
                let copied = MealItem {
                    id: Uuid::new_v4(),
                    meal_id: *meal_id,
                    ..item.clone()
                };
                insert_item(&mut *tx, &copied).await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit plan copy: {e}")))?;

        Ok(copy)
    }

    // ================================================================================
    // Meals
    // ================================================================================

    /// Insert a meal
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_meal(&self, meal: &Meal) -> AppResult<()> {
        insert_meal(&self.pool, meal).await
    }

    /// Get a meal
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_meal(&self, id: Uuid) -> AppResult<Option<Meal>> {
        let row = sqlx::query("SELECT * FROM meals WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get meal: {e}")))?;
        row.as_ref().map(row_to_meal).transpose()
    }

    /// Meals of a plan in order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_meals(&self, plan_id: Uuid) -> AppResult<Vec<Meal>> {
        let rows = sqlx::query("SELECT * FROM meals WHERE plan_id = $1 ORDER BY position, rowid")
            .bind(plan_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list meals: {e}")))?;
        rows.iter().map(row_to_meal).collect()
    }

    /// Next free position in a plan
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn next_meal_order(&self, plan_id: Uuid) -> AppResult<u32> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(position), 0) + 1 AS next FROM meals WHERE plan_id = $1",
        )
        .bind(plan_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to compute meal order: {e}")))?;
        Ok(get_u32(&row, "next"))
    }

    /// Save an edited meal
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_meal(&self, meal: &Meal) -> AppResult<()> {
        sqlx::query("UPDATE meals SET position = $1, time = $2, name = $3 WHERE id = $4")
            .bind(i64::from(meal.order))
            .bind(format_time(meal.time))
            .bind(&meal.name)
            .bind(meal.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update meal: {e}")))?;
        Ok(())
    }

    /// Delete a meal with its items
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_meal(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete meal: {e}")))?;
        Ok(())
    }

    /// Meals of a plan with their items, both in position order
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn meals_with_items(&self, plan_id: Uuid) -> AppResult<Vec<MealWithItems>> {
        let meals = self.list_meals(plan_id).await?;
        let item_rows = sqlx::query(
            r"
            SELECT meal_items.* FROM meal_items
            JOIN meals ON meals.id = meal_items.meal_id
            WHERE meals.plan_id = $1
            ORDER BY meal_items.position, meal_items.rowid
            ",
        )
        .bind(plan_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list meal items: {e}")))?;

        let mut items_by_meal: HashMap<Uuid, Vec<MealItem>> = HashMap::new();
        for row in &item_rows {
            let item = row_to_item(row)?;
            items_by_meal.entry(item.meal_id).or_default().push(item);
        }

        Ok(meals
            .into_iter()
            .map(|meal| {
                let items = items_by_meal.remove(&meal.id).unwrap_or_default();
                MealWithItems { meal, items }
            })
            .collect())
    }

    // ================================================================================
    // Meal items
    // ================================================================================

    /// Insert a meal item
    ///
    /// # Errors
    ///
    /// Returns a database error if the ingredient or unit does not exist
    pub async fn create_item(&self, item: &MealItem) -> AppResult<()> {
        insert_item(&self.pool, item).await
    }

    /// Get a meal item
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_item(&self, id: Uuid) -> AppResult<Option<MealItem>> {
        let row = sqlx::query("SELECT * FROM meal_items WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get meal item: {e}")))?;
        row.as_ref().map(row_to_item).transpose()
    }

    /// Next free position in a meal
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn next_item_order(&self, meal_id: Uuid) -> AppResult<u32> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(position), 0) + 1 AS next FROM meal_items WHERE meal_id = $1",
        )
        .bind(meal_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to compute item order: {e}")))?;
        Ok(get_u32(&row, "next"))
    }

    /// Save an edited meal item
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_item(&self, item: &MealItem) -> AppResult<()> {
        sqlx::query(
            "UPDATE meal_items SET ingredient_id = $1, weight_unit_id = $2, position = $3, amount = $4 WHERE id = $5",
        )
        .bind(item.ingredient_id.to_string())
        .bind(item.weight_unit_id.map(|id| id.to_string()))
        .bind(i64::from(item.order))
        .bind(item.amount)
        .bind(item.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update meal item: {e}")))?;
        Ok(())
    }

    /// Delete a meal item
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_item(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM meal_items WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete meal item: {e}")))?;
        Ok(())
    }

    // ================================================================================
    // Diary
    // ================================================================================

    /// Insert a diary entry
    ///
    /// # Errors
    ///
    /// Returns a database error if the ingredient or unit does not exist
    pub async fn create_log_item(&self, item: &NutritionLogItem) -> AppResult<()> {
        insert_log_item(&self.pool, item).await
    }

    /// Copy every item of a meal into the diary at `datetime`
    ///
    /// Either all entries are written or none.
    ///
    /// # Errors
    ///
    /// Returns a database error if the transaction fails
    pub async fn log_meal(
        &self,
        meal: &Meal,
        datetime: DateTime<Utc>,
    ) -> AppResult<Vec<NutritionLogItem>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let rows = sqlx::query(
            "SELECT * FROM meal_items WHERE meal_id = $1 ORDER BY position, rowid",
        )
        .bind(meal.id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to list meal items: {e}")))?;

        let mut logged = Vec::with_capacity(rows.len());
        for row in &rows {
            let item = row_to_item(row)?;
            let entry = NutritionLogItem {
                id: Uuid::new_v4(),
                plan_id: meal.plan_id,
                datetime,
                ingredient_id: item.ingredient_id,
                weight_unit_id: item.weight_unit_id,
                amount: item.amount,
            };
            insert_log_item(&mut *tx, &entry).await?;
            logged.push(entry);
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit meal log: {e}")))?;
        Ok(logged)
    }

    /// Get a diary entry
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_log_item(&self, id: Uuid) -> AppResult<Option<NutritionLogItem>> {
        let row = sqlx::query("SELECT * FROM nutrition_log_items WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get diary entry: {e}")))?;
        row.as_ref().map(row_to_log_item).transpose()
    }

    /// Diary entries of a plan, optionally restricted to one date
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_log_items(
        &self,
        plan_id: Uuid,
        date: Option<NaiveDate>,
    ) -> AppResult<Vec<NutritionLogItem>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM nutrition_log_items
            WHERE plan_id = $1 AND ($2 IS NULL OR substr(datetime, 1, 10) = $2)
            ORDER BY datetime
            ",
        )
        .bind(plan_id.to_string())
        .bind(date.map(format_date))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list diary entries: {e}")))?;
        rows.iter().map(row_to_log_item).collect()
    }

    /// Save an edited diary entry
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_log_item(&self, item: &NutritionLogItem) -> AppResult<()> {
        sqlx::query(
            "UPDATE nutrition_log_items SET datetime = $1, ingredient_id = $2, weight_unit_id = $3, amount = $4 WHERE id = $5",
        )
        .bind(item.datetime.to_rfc3339())
        .bind(item.ingredient_id.to_string())
        .bind(item.weight_unit_id.map(|id| id.to_string()))
        .bind(item.amount)
        .bind(item.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update diary entry: {e}")))?;
        Ok(())
    }

    /// Delete a diary entry
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_log_item(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM nutrition_log_items WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete diary entry: {e}")))?;
        Ok(())
    }
}

async fn insert_plan<'e, E>(executor: E, plan: &NutritionPlan) -> AppResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO nutrition_plans (id, user_id, description, created, has_goal_calories) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(plan.id.to_string())
    .bind(plan.user_id.to_string())
    .bind(&plan.description)
    .bind(format_date(plan.created))
    .bind(plan.has_goal_calories)
    .execute(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to create nutrition plan: {e}")))?;
    Ok(())
}

async fn insert_meal<'e, E>(executor: E, meal: &Meal) -> AppResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query("INSERT INTO meals (id, plan_id, position, time, name) VALUES ($1, $2, $3, $4, $5)")
        .bind(meal.id.to_string())
        .bind(meal.plan_id.to_string())
        .bind(i64::from(meal.order))
        .bind(format_time(meal.time))
        .bind(&meal.name)
        .execute(executor)
        .await
        .map_err(|e| AppError::database(format!("Failed to create meal: {e}")))?;
    Ok(())
}

async fn insert_log_item<'e, E>(executor: E, item: &NutritionLogItem) -> AppResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r"
        INSERT INTO nutrition_log_items (id, plan_id, datetime, ingredient_id, weight_unit_id, amount)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(item.id.to_string())
    .bind(item.plan_id.to_string())
    .bind(item.datetime.to_rfc3339())
    .bind(item.ingredient_id.to_string())
    .bind(item.weight_unit_id.map(|id| id.to_string()))
    .bind(item.amount)
    .execute(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to create diary entry: {e}")))?;
    Ok(())
}

async fn insert_item<'e, E>(executor: E, item: &MealItem) -> AppResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r"
        INSERT INTO meal_items (id, meal_id, ingredient_id, weight_unit_id, position, amount)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(item.id.to_string())
    .bind(item.meal_id.to_string())
    .bind(item.ingredient_id.to_string())
    .bind(item.weight_unit_id.map(|id| id.to_string()))
    .bind(i64::from(item.order))
    .bind(item.amount)
    .execute(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to create meal item: {e}")))?;
    Ok(())
}

fn row_to_plan(row: &SqliteRow) -> AppResult<NutritionPlan> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created: String = row.get("created");
    Ok(NutritionPlan {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        description: row.get("description"),
        created: parse_date(&created)?,
        has_goal_calories: row.get("has_goal_calories"),
    })
}

fn row_to_meal(row: &SqliteRow) -> AppResult<Meal> {
    let id: String = row.get("id");
    let plan_id: String = row.get("plan_id");
    Ok(Meal {
        id: parse_uuid(&id)?,
        plan_id: parse_uuid(&plan_id)?,
        order: get_u32(row, "position"),
        time: parse_optional_time(row.get("time"))?,
        name: row.get("name"),
    })
}

fn row_to_item(row: &SqliteRow) -> AppResult<MealItem> {
    let id: String = row.get("id");
    let meal_id: String = row.get("meal_id");
    let ingredient_id: String = row.get("ingredient_id");
    Ok(MealItem {
        id: parse_uuid(&id)?,
        meal_id: parse_uuid(&meal_id)?,
        ingredient_id: parse_uuid(&ingredient_id)?,
        weight_unit_id: parse_optional_uuid(row.get("weight_unit_id"))?,
        order: get_u32(row, "position"),
        amount: row.get("amount"),
    })
}

fn row_to_log_item(row: &SqliteRow) -> AppResult<NutritionLogItem> {
    let id: String = row.get("id");
    let plan_id: String = row.get("plan_id");
    let datetime: String = row.get("datetime");
    let ingredient_id: String = row.get("ingredient_id");
    Ok(NutritionLogItem {
        id: parse_uuid(&id)?,
        plan_id: parse_uuid(&plan_id)?,
        datetime: parse_timestamp(&datetime)?,
        ingredient_id: parse_uuid(&ingredient_id)?,
        weight_unit_id: parse_optional_uuid(row.get("weight_unit_id"))?,
        amount: row.get("amount"),
    })
}
