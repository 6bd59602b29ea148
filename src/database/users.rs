// ABOUTME: Database operations for user accounts and their profiles
// ABOUTME: Handles registration, guest accounts, profile settings and temporary user cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{
    execute_schema, format_date, get_u32, parse_optional_date, parse_optional_uuid,
    parse_timestamp, parse_uuid, Database,
};
use crate::errors::{map_unique_violation, AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;
use workout_core::models::{Gender, Intensity, MassUnit, User, UserProfile};
use workout_core::permissions::{DataOwner, UserRole};

const USER_EXISTS: &str = "A user with this username or email already exists";

/// Values for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name
    pub username: String,
    /// Contact address
    pub email: Option<String>,
    /// bcrypt hash
    pub password_hash: String,
    /// Initial role
    pub role: UserRole,
    /// Guest account
    pub is_temporary: bool,
}

impl Database {
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        execute_schema(
            self.pool(),
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE COLLATE NOCASE,
                email TEXT UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                last_active TEXT NOT NULL
            )
            ",
            "users",
        )
        .await?;

        execute_schema(
            self.pool(),
            r"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                gym_id TEXT REFERENCES gyms(id) ON DELETE SET NULL,
                is_temporary INTEGER NOT NULL DEFAULT 0,
                show_comments INTEGER NOT NULL DEFAULT 1,
                workout_reminder_active INTEGER NOT NULL DEFAULT 1,
                workout_reminder INTEGER NOT NULL DEFAULT 14,
                workout_duration INTEGER NOT NULL DEFAULT 12,
                last_workout_notification TEXT,
                age INTEGER,
                height REAL,
                gender TEXT,
                sleep_hours REAL NOT NULL DEFAULT 7,
                work_hours REAL NOT NULL DEFAULT 8,
                work_intensity TEXT NOT NULL DEFAULT 'low',
                sport_hours REAL NOT NULL DEFAULT 3,
                sport_intensity TEXT NOT NULL DEFAULT 'medium',
                freetime_hours REAL NOT NULL DEFAULT 8,
                freetime_intensity TEXT NOT NULL DEFAULT 'low',
                calories REAL NOT NULL DEFAULT 2500,
                weight_unit TEXT NOT NULL DEFAULT 'kg',
                ro_access INTEGER NOT NULL DEFAULT 0,
                num_days_weight_reminder INTEGER NOT NULL DEFAULT 0
            )
            ",
            "user_profiles",
        )
        .await?;

        execute_schema(
            self.pool(),
            "CREATE INDEX IF NOT EXISTS idx_user_profiles_gym ON user_profiles(gym_id)",
            "idx_user_profiles_gym",
        )
        .await
    }
}

/// Manager for accounts and profiles
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an account together with its default profile
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the username or email is taken
    pub async fn create_user(&self, new_user: &NewUser) -> AppResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            is_active: true,
            created_at: now,
            last_active: now,
        };
        let mut profile = UserProfile::with_defaults(user.id);
        profile.is_temporary = new_user.is_temporary;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO users (id, username, email, password_hash, role, is_active, created_at, last_active)
            VALUES ($1, $2, $3, $4, $5, 1, $6, $6)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, USER_EXISTS, "Failed to create user"))?;

        sqlx::query("INSERT INTO user_profiles (user_id, is_temporary) VALUES ($1, $2)")
            .bind(user.id.to_string())
            .bind(profile.is_temporary)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to create profile: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit user: {e}")))?;

        Ok(user)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Get a user by username or email
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = $1 OR email = $1 LIMIT 1")
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Record a successful authentication
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn touch_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = $1 WHERE id = $2")
            .bind(Utc::now().to_rfc3339())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last active: {e}")))?;
        Ok(())
    }

    /// Change the contact address
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when another user has the address
    pub async fn update_email(&self, user_id: Uuid, email: Option<&str>) -> AppResult<()> {
        sqlx::query("UPDATE users SET email = $1 WHERE id = $2")
            .bind(email)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, USER_EXISTS, "Failed to update email"))?;
        Ok(())
    }

    /// Turn a guest account into a regular one
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the new username or email is taken
    pub async fn convert_guest(
        &self,
        user_id: Uuid,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("UPDATE users SET username = $1, email = $2, password_hash = $3 WHERE id = $4")
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, USER_EXISTS, "Failed to convert guest"))?;

        sqlx::query("UPDATE user_profiles SET is_temporary = 0 WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to update profile: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit guest conversion: {e}")))
    }

    /// Change a user's role
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown users
    pub async fn set_role(&self, user_id: Uuid, role: UserRole) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set role: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// Activate or deactivate an account
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown users
    pub async fn set_active(&self, user_id: Uuid, active: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(active)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set active flag: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// Get a user's profile
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the user has no profile
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get profile: {e}")))?
            .ok_or_else(|| AppError::not_found("Profile"))?;
        row_to_profile(&row)
    }

    /// Save every editable profile field
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_profile(&self, profile: &UserProfile) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE user_profiles SET
                show_comments = $1, workout_reminder_active = $2, workout_reminder = $3,
                workout_duration = $4, age = $5, height = $6, gender = $7,
                sleep_hours = $8, work_hours = $9, work_intensity = $10,
                sport_hours = $11, sport_intensity = $12, freetime_hours = $13,
                freetime_intensity = $14, calories = $15, weight_unit = $16,
                ro_access = $17, num_days_weight_reminder = $18
            WHERE user_id = $19
            ",
        )
        .bind(profile.show_comments)
        .bind(profile.workout_reminder_active)
        .bind(i64::from(profile.workout_reminder))
        .bind(i64::from(profile.workout_duration))
        .bind(profile.age.map(i64::from))
        .bind(profile.height)
        .bind(profile.gender.map(|g| g.as_str()))
        .bind(profile.sleep_hours)
        .bind(profile.work_hours)
        .bind(profile.work_intensity.as_str())
        .bind(profile.sport_hours)
        .bind(profile.sport_intensity.as_str())
        .bind(profile.freetime_hours)
        .bind(profile.freetime_intensity.as_str())
        .bind(profile.calories)
        .bind(profile.weight_unit.as_str())
        .bind(profile.ro_access)
        .bind(i64::from(profile.num_days_weight_reminder))
        .bind(profile.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update profile: {e}")))?;
        Ok(())
    }

    /// Remember when the last workout reminder went out
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_last_workout_notification(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<()> {
        sqlx::query("UPDATE user_profiles SET last_workout_notification = $1 WHERE user_id = $2")
            .bind(format_date(date))
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update notification date: {e}")))?;
        Ok(())
    }

    /// Assign the user to a gym, or remove them with `None`
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown users
    pub async fn set_gym(&self, user_id: Uuid, gym_id: Option<Uuid>) -> AppResult<()> {
        let result = sqlx::query("UPDATE user_profiles SET gym_id = $1 WHERE user_id = $2")
            .bind(gym_id.map(|id| id.to_string()))
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set gym: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// Ownership facts used by the access policy
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the user has no profile
    pub async fn data_owner(&self, user_id: Uuid) -> AppResult<DataOwner> {
        let profile = self.get_profile(user_id).await?;
        Ok(DataOwner {
            user_id,
            gym_id: profile.gym_id,
            ro_access: profile.ro_access,
        })
    }

    /// All active users with their profiles
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_users_with_profiles(&self) -> AppResult<Vec<(User, UserProfile)>> {
        let rows = sqlx::query(
            r"
            SELECT u.*, p.* FROM users u
            JOIN user_profiles p ON p.user_id = u.id
            WHERE u.is_active = 1
            ORDER BY u.username
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list users: {e}")))?;

        rows.iter()
            .map(|row| Ok((row_to_user(row)?, row_to_profile(row)?)))
            .collect()
    }

    /// Users belonging to a gym with their profiles
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_gym_users(&self, gym_id: Uuid) -> AppResult<Vec<(User, UserProfile)>> {
        let rows = sqlx::query(
            r"
            SELECT u.*, p.* FROM users u
            JOIN user_profiles p ON p.user_id = u.id
            WHERE p.gym_id = $1
            ORDER BY u.username
            ",
        )
        .bind(gym_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list gym users: {e}")))?;

        rows.iter()
            .map(|row| Ok((row_to_user(row)?, row_to_profile(row)?)))
            .collect()
    }

    /// Delete guest accounts created before `created_before`
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_temporary_users(&self, created_before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM users
            WHERE created_at < $1
              AND id IN (SELECT user_id FROM user_profiles WHERE is_temporary = 1)
            ",
        )
        .bind(created_before.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete temporary users: {e}")))?;
        Ok(result.rows_affected())
    }

    /// Number of accounts
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_users(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count users: {e}")))?;
        Ok(row.get("count"))
    }
}

pub(crate) fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.get("id");
    let role: String = row.get("role");
    let created_at: String = row.get("created_at");
    let last_active: String = row.get("last_active");

    Ok(User {
        id: parse_uuid(&id)?,
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: UserRole::parse(&role),
        is_active: row.get("is_active"),
        created_at: parse_timestamp(&created_at)?,
        last_active: parse_timestamp(&last_active)?,
    })
}

pub(crate) fn row_to_profile(row: &SqliteRow) -> AppResult<UserProfile> {
    let user_id: String = row.get("user_id");
    let gender: Option<String> = row.get("gender");
    let age: Option<i64> = row.get("age");
    let work_intensity: String = row.get("work_intensity");
    let sport_intensity: String = row.get("sport_intensity");
    let freetime_intensity: String = row.get("freetime_intensity");
    let weight_unit: String = row.get("weight_unit");

    Ok(UserProfile {
        user_id: parse_uuid(&user_id)?,
        gym_id: parse_optional_uuid(row.get("gym_id"))?,
        is_temporary: row.get("is_temporary"),
        show_comments: row.get("show_comments"),
        workout_reminder_active: row.get("workout_reminder_active"),
        workout_reminder: get_u32(row, "workout_reminder"),
        workout_duration: get_u32(row, "workout_duration"),
        last_workout_notification: parse_optional_date(row.get("last_workout_notification"))?,
        age: age.map(|a| a.max(0) as u32),
        height: row.get("height"),
        gender: gender.as_deref().and_then(Gender::parse),
        sleep_hours: row.get("sleep_hours"),
        work_hours: row.get("work_hours"),
        work_intensity: Intensity::parse(&work_intensity),
        sport_hours: row.get("sport_hours"),
        sport_intensity: Intensity::parse(&sport_intensity),
        freetime_hours: row.get("freetime_hours"),
        freetime_intensity: Intensity::parse(&freetime_intensity),
        calories: row.get("calories"),
        weight_unit: MassUnit::parse(&weight_unit),
        ro_access: row.get("ro_access"),
        num_days_weight_reminder: get_u32(row, "num_days_weight_reminder"),
    })
}
