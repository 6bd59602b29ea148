// ABOUTME: Database operations for body weight entries
// ABOUTME: One entry per user and date, with range listing and transactional bulk import
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{execute_schema, format_date, parse_date, parse_uuid, Database};
use crate::errors::{map_unique_violation, AppError, AppResult};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;
use workout_core::models::WeightEntry;

const DUPLICATE_DATE: &str = "A weight entry for this date already exists";

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Rows written
    pub imported: usize,
    /// Dates that already had an entry and were left untouched
    pub skipped: Vec<NaiveDate>,
}

impl Database {
    pub(super) async fn migrate_weight(&self) -> AppResult<()> {
        execute_schema(
            self.pool(),
            r"
            CREATE TABLE IF NOT EXISTS weight_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                weight REAL NOT NULL,
                UNIQUE (user_id, date)
            )
            ",
            "weight_entries",
        )
        .await
    }
}

/// Manager for weight entries
pub struct WeightManager {
    pool: SqlitePool,
}

impl WeightManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an entry
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the user already has an entry for that date
    pub async fn create_entry(&self, entry: &WeightEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO weight_entries (id, user_id, date, weight) VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.id.to_string())
        .bind(entry.user_id.to_string())
        .bind(format_date(entry.date))
        .bind(entry.weight)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_DATE, "Failed to create weight entry"))?;
        Ok(())
    }

    /// Get an entry
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_entry(&self, id: Uuid) -> AppResult<Option<WeightEntry>> {
        let row = sqlx::query("SELECT * FROM weight_entries WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get weight entry: {e}")))?;
        row.as_ref().map(row_to_entry).transpose()
    }

    /// A user's entries between two optional inclusive bounds, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_entries(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<WeightEntry>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM weight_entries
            WHERE user_id = $1
              AND ($2 IS NULL OR date >= $2)
              AND ($3 IS NULL OR date <= $3)
            ORDER BY date
            ",
        )
        .bind(user_id.to_string())
        .bind(from.map(format_date))
        .bind(to.map(format_date))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list weight entries: {e}")))?;
        rows.iter().map(row_to_entry).collect()
    }

    /// Save an edited entry
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when moving the entry onto a date that is taken
    pub async fn update_entry(&self, entry: &WeightEntry) -> AppResult<()> {
        sqlx::query("UPDATE weight_entries SET date = $1, weight = $2 WHERE id = $3")
            .bind(format_date(entry.date))
            .bind(entry.weight)
            .bind(entry.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, DUPLICATE_DATE, "Failed to update weight entry"))?;
        Ok(())
    }

    /// Delete an entry
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_entry(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM weight_entries WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete weight entry: {e}")))?;
        Ok(())
    }

    /// Most recent entry
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn latest_entry(&self, user_id: Uuid) -> AppResult<Option<WeightEntry>> {
        let row = sqlx::query(
            "SELECT * FROM weight_entries WHERE user_id = $1 ORDER BY date DESC LIMIT 1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get latest weight entry: {e}")))?;
        row.as_ref().map(row_to_entry).transpose()
    }

    /// Insert many entries in one transaction, skipping dates that already have one
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails, in which case nothing is written
    pub async fn import_entries(
        &self,
        user_id: Uuid,
        entries: &[(NaiveDate, f64)],
    ) -> AppResult<ImportReport> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let mut report = ImportReport::default();
        for (date, weight) in entries {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO weight_entries (id, user_id, date, weight) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id.to_string())
            .bind(format_date(*date))
            .bind(*weight)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to import weight entry: {e}")))?;

            if result.rows_affected() == 0 {
                report.skipped.push(*date);
            } else {
                report.imported += 1;
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit weight import: {e}")))?;
        Ok(report)
    }
}

fn row_to_entry(row: &SqliteRow) -> AppResult<WeightEntry> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let date: String = row.get("date");
    Ok(WeightEntry {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        date: parse_date(&date)?,
        weight: row.get("weight"),
    })
}
