// ABOUTME: Database operations for gyms and gym administration
// ABOUTME: Gyms, gym and user configuration, admin notes, contract types, options and contracts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{
    execute_schema, format_date, from_json, get_u32, parse_date, parse_optional_date,
    parse_optional_uuid, parse_timestamp, parse_uuid, to_json, Database,
};
use crate::errors::{map_unique_violation, AppError, AppResult};
use chrono::{NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;
use workout_core::constants::defaults;
use workout_core::gym::{is_inactive, MemberActivity};
use workout_core::models::{
    AdminUserNote, Contract, ContractOption, ContractType, Gym, GymAdminConfig, GymConfig,
    GymUserConfig, PaymentInterval,
};

impl Database {
    pub(super) async fn migrate_gyms(&self) -> AppResult<()> {
        execute_schema(
            self.pool(),
            r"
            CREATE TABLE IF NOT EXISTS gyms (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                phone TEXT,
                email TEXT,
                owner TEXT,
                zip_code TEXT,
                city TEXT,
                street TEXT
            )
            ",
            "gyms",
        )
        .await
    }

    pub(super) async fn migrate_gym_administration(&self) -> AppResult<()> {
        let pool = self.pool();
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS gym_config (
                gym_id TEXT PRIMARY KEY REFERENCES gyms(id) ON DELETE CASCADE,
                weeks_inactive INTEGER NOT NULL DEFAULT 4
            )
            ",
            "gym_config",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS gym_admin_config (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                gym_id TEXT NOT NULL REFERENCES gyms(id) ON DELETE CASCADE,
                overview_inactive INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (user_id, gym_id)
            )
            ",
            "gym_admin_config",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS gym_user_config (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                gym_id TEXT NOT NULL REFERENCES gyms(id) ON DELETE CASCADE,
                include_inactive INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (user_id, gym_id)
            )
            ",
            "gym_user_config",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS admin_user_notes (
                id TEXT PRIMARY KEY,
                member_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                note TEXT NOT NULL,
                created_at TEXT NOT NULL,
                edited_at TEXT NOT NULL,
                edited_by TEXT NOT NULL
            )
            ",
            "admin_user_notes",
        )
        .await?;
        for table in ["contract_types", "contract_options"] {
            let sql = format!(
                r"
                CREATE TABLE IF NOT EXISTS {table} (
                    id TEXT PRIMARY KEY,
                    gym_id TEXT NOT NULL REFERENCES gyms(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT ''
                )
                "
            );
            execute_schema(pool, &sql, table).await?;
        }
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS contracts (
                id TEXT PRIMARY KEY,
                gym_id TEXT NOT NULL REFERENCES gyms(id) ON DELETE CASCADE,
                member_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                author_id TEXT NOT NULL REFERENCES users(id),
                contract_type_id TEXT REFERENCES contract_types(id) ON DELETE SET NULL,
                options TEXT NOT NULL DEFAULT '[]',
                amount REAL NOT NULL DEFAULT 0,
                payment TEXT NOT NULL DEFAULT 'monthly',
                is_active INTEGER NOT NULL DEFAULT 1,
                date_start TEXT NOT NULL,
                date_end TEXT,
                email TEXT,
                zip_code TEXT,
                city TEXT,
                street TEXT,
                phone TEXT,
                profession TEXT,
                note TEXT,
                created_at TEXT NOT NULL
            )
            ",
            "contracts",
        )
        .await
    }
}

/// Manager for gyms and their administration
pub struct GymManager {
    pool: SqlitePool,
}

impl GymManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ================================================================================
    // Gyms
    // ================================================================================

    /// Insert a gym together with its default configuration
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the name is taken
    pub async fn create_gym(&self, gym: &Gym) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO gyms (id, name, phone, email, owner, zip_code, city, street)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(gym.id.to_string())
        .bind(&gym.name)
        .bind(&gym.phone)
        .bind(&gym.email)
        .bind(&gym.owner)
        .bind(&gym.zip_code)
        .bind(&gym.city)
        .bind(&gym.street)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, "A gym with this name already exists", "Failed to create gym")
        })?;

        sqlx::query("INSERT INTO gym_config (gym_id, weeks_inactive) VALUES ($1, $2)")
            .bind(gym.id.to_string())
            .bind(i64::from(defaults::GYM_WEEKS_INACTIVE))
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to create gym config: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit gym: {e}")))
    }

    /// Get a gym
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_gym(&self, id: Uuid) -> AppResult<Option<Gym>> {
        let row = sqlx::query("SELECT * FROM gyms WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get gym: {e}")))?;
        row.as_ref().map(row_to_gym).transpose()
    }

    /// All gyms by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_gyms(&self) -> AppResult<Vec<Gym>> {
        let rows = sqlx::query("SELECT * FROM gyms ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list gyms: {e}")))?;
        rows.iter().map(row_to_gym).collect()
    }

    /// Save an edited gym
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the new name is taken
    pub async fn update_gym(&self, gym: &Gym) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE gyms SET name = $1, phone = $2, email = $3, owner = $4, zip_code = $5,
                city = $6, street = $7
            WHERE id = $8
            ",
        )
        .bind(&gym.name)
        .bind(&gym.phone)
        .bind(&gym.email)
        .bind(&gym.owner)
        .bind(&gym.zip_code)
        .bind(&gym.city)
        .bind(&gym.street)
        .bind(gym.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, "A gym with this name already exists", "Failed to update gym")
        })?;
        Ok(())
    }

    /// Delete a gym; members keep their accounts and lose the gym link
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown gyms
    pub async fn delete_gym(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM gyms WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete gym: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Gym"));
        }
        Ok(())
    }

    // ================================================================================
    // Configuration
    // ================================================================================

    /// Gym-wide settings, defaults when none were stored
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_config(&self, gym_id: Uuid) -> AppResult<GymConfig> {
        let row = sqlx::query("SELECT weeks_inactive FROM gym_config WHERE gym_id = $1")
            .bind(gym_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get gym config: {e}")))?;
        Ok(GymConfig {
            gym_id,
            weeks_inactive: row.map_or(defaults::GYM_WEEKS_INACTIVE, |r| {
                get_u32(&r, "weeks_inactive")
            }),
        })
    }

    /// Store gym-wide settings
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails
    pub async fn update_config(&self, config: &GymConfig) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO gym_config (gym_id, weeks_inactive) VALUES ($1, $2)
            ON CONFLICT(gym_id) DO UPDATE SET weeks_inactive = excluded.weeks_inactive
            ",
        )
        .bind(config.gym_id.to_string())
        .bind(i64::from(config.weeks_inactive))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update gym config: {e}")))?;
        Ok(())
    }

    /// Dashboard settings of a manager or trainer
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_admin_config(&self, user_id: Uuid, gym_id: Uuid) -> AppResult<GymAdminConfig> {
        let row = sqlx::query(
            "SELECT overview_inactive FROM gym_admin_config WHERE user_id = $1 AND gym_id = $2",
        )
        .bind(user_id.to_string())
        .bind(gym_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get admin config: {e}")))?;
        Ok(GymAdminConfig {
            user_id,
            gym_id,
            overview_inactive: row.is_none_or(|r| r.get("overview_inactive")),
        })
    }

    /// Store dashboard settings
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails
    pub async fn set_admin_config(&self, config: &GymAdminConfig) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO gym_admin_config (user_id, gym_id, overview_inactive) VALUES ($1, $2, $3)
            ON CONFLICT(user_id, gym_id) DO UPDATE SET overview_inactive = excluded.overview_inactive
            ",
        )
        .bind(config.user_id.to_string())
        .bind(config.gym_id.to_string())
        .bind(config.overview_inactive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to set admin config: {e}")))?;
        Ok(())
    }

    /// Per-member settings
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_config(&self, user_id: Uuid, gym_id: Uuid) -> AppResult<GymUserConfig> {
        let row = sqlx::query(
            "SELECT include_inactive FROM gym_user_config WHERE user_id = $1 AND gym_id = $2",
        )
        .bind(user_id.to_string())
        .bind(gym_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get member config: {e}")))?;
        Ok(GymUserConfig {
            user_id,
            gym_id,
            include_inactive: row.is_none_or(|r| r.get("include_inactive")),
        })
    }

    /// Store per-member settings
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails
    pub async fn set_user_config(&self, config: &GymUserConfig) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO gym_user_config (user_id, gym_id, include_inactive) VALUES ($1, $2, $3)
            ON CONFLICT(user_id, gym_id) DO UPDATE SET include_inactive = excluded.include_inactive
            ",
        )
        .bind(config.user_id.to_string())
        .bind(config.gym_id.to_string())
        .bind(config.include_inactive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to set member config: {e}")))?;
        Ok(())
    }

    /// Members of a gym with their last training date
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn member_activity(
        &self,
        gym_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<Vec<MemberActivity>> {
        let weeks_inactive = self.get_config(gym_id).await?.weeks_inactive;

        let rows = sqlx::query(
            r"
            SELECT
                u.id,
                u.username,
                COALESCE(c.include_inactive, 1) AS include_inactive,
                (SELECT MAX(date) FROM workout_logs WHERE user_id = u.id) AS last_log,
                (SELECT MAX(date) FROM workout_sessions WHERE user_id = u.id) AS last_session
            FROM users u
            JOIN user_profiles p ON p.user_id = u.id
            LEFT JOIN gym_user_config c ON c.user_id = u.id AND c.gym_id = $1
            WHERE p.gym_id = $1
            ORDER BY u.username
            ",
        )
        .bind(gym_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list gym members: {e}")))?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let last_log = parse_optional_date(row.get("last_log"))?;
                let last_session = parse_optional_date(row.get("last_session"))?;
                let last_activity = last_log.max(last_session);
                Ok(MemberActivity {
                    user_id: parse_uuid(&id)?,
                    username: row.get("username"),
                    last_activity,
                    inactive: is_inactive(last_activity, today, weeks_inactive),
                    include_inactive: row.get("include_inactive"),
                })
            })
            .collect()
    }

    // ================================================================================
    // Admin notes
    // ================================================================================

    /// Insert a note
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_note(&self, note: &AdminUserNote) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO admin_user_notes (id, member_id, author_id, note, created_at, edited_at, edited_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(note.id.to_string())
        .bind(note.member_id.to_string())
        .bind(note.author_id.to_string())
        .bind(&note.note)
        .bind(note.created_at.to_rfc3339())
        .bind(note.edited_at.to_rfc3339())
        .bind(note.edited_by.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create note: {e}")))?;
        Ok(())
    }

    /// Get a note
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_note(&self, id: Uuid) -> AppResult<Option<AdminUserNote>> {
        let row = sqlx::query("SELECT * FROM admin_user_notes WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get note: {e}")))?;
        row.as_ref().map(row_to_note).transpose()
    }

    /// Notes about a member, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_notes(&self, member_id: Uuid) -> AppResult<Vec<AdminUserNote>> {
        let rows = sqlx::query(
            "SELECT * FROM admin_user_notes WHERE member_id = $1 ORDER BY created_at DESC",
        )
        .bind(member_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list notes: {e}")))?;
        rows.iter().map(row_to_note).collect()
    }

    /// Replace a note's text and record the editor
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown notes
    pub async fn update_note(
        &self,
        id: Uuid,
        text: &str,
        editor: Uuid,
    ) -> AppResult<AdminUserNote> {
        let result = sqlx::query(
            "UPDATE admin_user_notes SET note = $1, edited_at = $2, edited_by = $3 WHERE id = $4",
        )
        .bind(text)
        .bind(Utc::now().to_rfc3339())
        .bind(editor.to_string())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update note: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Note"));
        }
        self.get_note(id).await?.ok_or_else(|| AppError::not_found("Note"))
    }

    /// Delete a note
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_note(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM admin_user_notes WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete note: {e}")))?;
        Ok(())
    }

    // ================================================================================
    // Contract types and options
    // ================================================================================

    /// Insert a contract type
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_contract_type(&self, kind: &ContractType) -> AppResult<()> {
        insert_catalog_row(
            &self.pool,
            "contract_types",
            kind.id,
            kind.gym_id,
            &kind.name,
            &kind.description,
        )
        .await
    }

    /// Get a contract type
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_contract_type(&self, id: Uuid) -> AppResult<Option<ContractType>> {
        let row = sqlx::query("SELECT * FROM contract_types WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get contract type: {e}")))?;
        row.as_ref()
            .map(|r| {
                row_to_catalog(r).map(|(id, gym_id, name, description)| ContractType {
                    id,
                    gym_id,
                    name,
                    description,
                })
            })
            .transpose()
    }

    /// Contract types of a gym
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_contract_types(&self, gym_id: Uuid) -> AppResult<Vec<ContractType>> {
        let rows = sqlx::query("SELECT * FROM contract_types WHERE gym_id = $1 ORDER BY name")
            .bind(gym_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list contract types: {e}")))?;
        rows.iter()
            .map(|r| {
                row_to_catalog(r).map(|(id, gym_id, name, description)| ContractType {
                    id,
                    gym_id,
                    name,
                    description,
                })
            })
            .collect()
    }

    /// Save an edited contract type
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_contract_type(&self, kind: &ContractType) -> AppResult<()> {
        update_catalog_row(
            &self.pool,
            "contract_types",
            kind.id,
            &kind.name,
            &kind.description,
        )
        .await
    }

    /// Delete a contract type; contracts of that type keep existing without one
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_contract_type(&self, id: Uuid) -> AppResult<()> {
        delete_catalog_row(&self.pool, "contract_types", id).await
    }

    /// Insert a contract option
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_contract_option(&self, option: &ContractOption) -> AppResult<()> {
        insert_catalog_row(
            &self.pool,
            "contract_options",
            option.id,
            option.gym_id,
            &option.name,
            &option.description,
        )
        .await
    }

    /// Get a contract option
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_contract_option(&self, id: Uuid) -> AppResult<Option<ContractOption>> {
        let row = sqlx::query("SELECT * FROM contract_options WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get contract option: {e}")))?;
        row.as_ref()
            .map(|r| {
                row_to_catalog(r).map(|(id, gym_id, name, description)| ContractOption {
                    id,
                    gym_id,
                    name,
                    description,
                })
            })
            .transpose()
    }

    /// Contract options of a gym
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_contract_options(&self, gym_id: Uuid) -> AppResult<Vec<ContractOption>> {
        let rows = sqlx::query("SELECT * FROM contract_options WHERE gym_id = $1 ORDER BY name")
            .bind(gym_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list contract options: {e}")))?;
        rows.iter()
            .map(|r| {
                row_to_catalog(r).map(|(id, gym_id, name, description)| ContractOption {
                    id,
                    gym_id,
                    name,
                    description,
                })
            })
            .collect()
    }

    /// Save an edited contract option
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_contract_option(&self, option: &ContractOption) -> AppResult<()> {
        update_catalog_row(
            &self.pool,
            "contract_options",
            option.id,
            &option.name,
            &option.description,
        )
        .await
    }

    /// Delete a contract option
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_contract_option(&self, id: Uuid) -> AppResult<()> {
        delete_catalog_row(&self.pool, "contract_options", id).await
    }

    // ================================================================================
    // Contracts
    // ================================================================================

    /// Insert a contract
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_contract(&self, contract: &Contract) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO contracts (
                id, gym_id, member_id, author_id, contract_type_id, options, amount, payment,
                is_active, date_start, date_end, email, zip_code, city, street, phone,
                profession, note, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ",
        )
        .bind(contract.id.to_string())
        .bind(contract.gym_id.to_string())
        .bind(contract.member_id.to_string())
        .bind(contract.author_id.to_string())
        .bind(contract.contract_type_id.map(|id| id.to_string()))
        .bind(to_json(&contract.options)?)
        .bind(contract.amount)
        .bind(contract.payment.as_str())
        .bind(contract.is_active)
        .bind(format_date(contract.date_start))
        .bind(contract.date_end.map(format_date))
        .bind(&contract.email)
        .bind(&contract.zip_code)
        .bind(&contract.city)
        .bind(&contract.street)
        .bind(&contract.phone)
        .bind(&contract.profession)
        .bind(&contract.note)
        .bind(contract.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create contract: {e}")))?;
        Ok(())
    }

    /// Get a contract
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_contract(&self, id: Uuid) -> AppResult<Option<Contract>> {
        let row = sqlx::query("SELECT * FROM contracts WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get contract: {e}")))?;
        row.as_ref().map(row_to_contract).transpose()
    }

    /// Contracts of a member, newest start date first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_contracts(&self, member_id: Uuid) -> AppResult<Vec<Contract>> {
        let rows = sqlx::query(
            "SELECT * FROM contracts WHERE member_id = $1 ORDER BY date_start DESC",
        )
        .bind(member_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list contracts: {e}")))?;
        rows.iter().map(row_to_contract).collect()
    }

    /// Save an edited contract
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_contract(&self, contract: &Contract) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE contracts SET
                contract_type_id = $1, options = $2, amount = $3, payment = $4, is_active = $5,
                date_start = $6, date_end = $7, email = $8, zip_code = $9, city = $10,
                street = $11, phone = $12, profession = $13, note = $14
            WHERE id = $15
            ",
        )
        .bind(contract.contract_type_id.map(|id| id.to_string()))
        .bind(to_json(&contract.options)?)
        .bind(contract.amount)
        .bind(contract.payment.as_str())
        .bind(contract.is_active)
        .bind(format_date(contract.date_start))
        .bind(contract.date_end.map(format_date))
        .bind(&contract.email)
        .bind(&contract.zip_code)
        .bind(&contract.city)
        .bind(&contract.street)
        .bind(&contract.phone)
        .bind(&contract.profession)
        .bind(&contract.note)
        .bind(contract.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update contract: {e}")))?;
        Ok(())
    }

    /// Delete a contract
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_contract(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete contract: {e}")))?;
        Ok(())
    }
}

// Contract types and options share one table shape; `table` is always one of
// the two literal names above.

async fn insert_catalog_row(
    pool: &SqlitePool,
    table: &str,
    id: Uuid,
    gym_id: Uuid,
    name: &str,
    description: &str,
) -> AppResult<()> {
    let sql =
        format!("INSERT INTO {table} (id, gym_id, name, description) VALUES ($1, $2, $3, $4)");
    sqlx::query(&sql)
        .bind(id.to_string())
        .bind(gym_id.to_string())
        .bind(name)
        .bind(description)
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert into {table}: {e}")))?;
    Ok(())
}

async fn update_catalog_row(
    pool: &SqlitePool,
    table: &str,
    id: Uuid,
    name: &str,
    description: &str,
) -> AppResult<()> {
    let sql = format!("UPDATE {table} SET name = $1, description = $2 WHERE id = $3");
    sqlx::query(&sql)
        .bind(name)
        .bind(description)
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update {table}: {e}")))?;
    Ok(())
}

async fn delete_catalog_row(pool: &SqlitePool, table: &str, id: Uuid) -> AppResult<()> {
    let sql = format!("DELETE FROM {table} WHERE id = $1");
    sqlx::query(&sql)
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete from {table}: {e}")))?;
    Ok(())
}

fn row_to_catalog(row: &SqliteRow) -> AppResult<(Uuid, Uuid, String, String)> {
    let id: String = row.get("id");
    let gym_id: String = row.get("gym_id");
    Ok((
        parse_uuid(&id)?,
        parse_uuid(&gym_id)?,
        row.get("name"),
        row.get("description"),
    ))
}

fn row_to_gym(row: &SqliteRow) -> AppResult<Gym> {
    let id: String = row.get("id");
    Ok(Gym {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        phone: row.get("phone"),
        email: row.get("email"),
        owner: row.get("owner"),
        zip_code: row.get("zip_code"),
        city: row.get("city"),
        street: row.get("street"),
    })
}

fn row_to_note(row: &SqliteRow) -> AppResult<AdminUserNote> {
    let id: String = row.get("id");
    let member_id: String = row.get("member_id");
    let author_id: String = row.get("author_id");
    let edited_by: String = row.get("edited_by");
    let created_at: String = row.get("created_at");
    let edited_at: String = row.get("edited_at");
    Ok(AdminUserNote {
        id: parse_uuid(&id)?,
        member_id: parse_uuid(&member_id)?,
        author_id: parse_uuid(&author_id)?,
        note: row.get("note"),
        created_at: parse_timestamp(&created_at)?,
        edited_at: parse_timestamp(&edited_at)?,
        edited_by: parse_uuid(&edited_by)?,
    })
}

fn row_to_contract(row: &SqliteRow) -> AppResult<Contract> {
    let id: String = row.get("id");
    let gym_id: String = row.get("gym_id");
    let member_id: String = row.get("member_id");
    let author_id: String = row.get("author_id");
    let options: String = row.get("options");
    let payment: String = row.get("payment");
    let date_start: String = row.get("date_start");
    let created_at: String = row.get("created_at");
    Ok(Contract {
        id: parse_uuid(&id)?,
        gym_id: parse_uuid(&gym_id)?,
        member_id: parse_uuid(&member_id)?,
        author_id: parse_uuid(&author_id)?,
        contract_type_id: parse_optional_uuid(row.get("contract_type_id"))?,
        options: from_json(&options)?,
        amount: row.get("amount"),
        payment: PaymentInterval::parse(&payment),
        is_active: row.get("is_active"),
        date_start: parse_date(&date_start)?,
        date_end: parse_optional_date(row.get("date_end"))?,
        email: row.get("email"),
        zip_code: row.get("zip_code"),
        city: row.get("city"),
        street: row.get("street"),
        phone: row.get("phone"),
        profession: row.get("profession"),
        note: row.get("note"),
        created_at: parse_timestamp(&created_at)?,
    })
}
