// ABOUTME: Database operations for social groups, memberships and join applications
// ABOUTME: Membership changes read, decide and write inside one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{execute_schema, parse_optional_uuid, parse_timestamp, parse_uuid, Database};
use crate::errors::{map_unique_violation, AppError, AppResult};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use uuid::Uuid;
use workout_core::groups::{
    demote_decision, leave_decision, removal_decision, require_admin, LeaveOutcome,
};
use workout_core::models::{Group, GroupApplication, Membership};

impl Database {
    pub(super) async fn migrate_groups(&self) -> AppResult<()> {
        let pool = self.pool();
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS user_groups (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                description TEXT NOT NULL DEFAULT '',
                public INTEGER NOT NULL DEFAULT 1,
                creator_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                gym_id TEXT REFERENCES gyms(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL
            )
            ",
            "user_groups",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS group_memberships (
                group_id TEXT NOT NULL REFERENCES user_groups(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                admin INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                PRIMARY KEY (group_id, user_id)
            )
            ",
            "group_memberships",
        )
        .await?;
        execute_schema(
            pool,
            r"
            CREATE TABLE IF NOT EXISTS group_applications (
                group_id TEXT NOT NULL REFERENCES user_groups(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                PRIMARY KEY (group_id, user_id)
            )
            ",
            "group_applications",
        )
        .await
    }
}

/// Manager for groups
pub struct GroupManager {
    pool: SqlitePool,
}

impl GroupManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a group and make its creator the first administrator
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the name is taken
    pub async fn create_group(&self, group: &Group) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO user_groups (id, name, description, public, creator_id, gym_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(group.id.to_string())
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.public)
        .bind(group.creator_id.to_string())
        .bind(group.gym_id.map(|id| id.to_string()))
        .bind(group.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                "A group with this name already exists",
                "Failed to create group",
            )
        })?;

        sqlx::query(
            "INSERT INTO group_memberships (group_id, user_id, admin, created_at) VALUES ($1, $2, 1, $3)",
        )
        .bind(group.id.to_string())
        .bind(group.creator_id.to_string())
        .bind(group.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to add group creator: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit group: {e}")))
    }

    /// Get a group
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_group(&self, id: Uuid) -> AppResult<Option<Group>> {
        let row = sqlx::query("SELECT * FROM user_groups WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get group: {e}")))?;
        row.as_ref().map(row_to_group).transpose()
    }

    /// All groups by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_groups(&self) -> AppResult<Vec<Group>> {
        let rows = sqlx::query("SELECT * FROM user_groups ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list groups: {e}")))?;
        rows.iter().map(row_to_group).collect()
    }

    /// Groups the user belongs to
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_user_groups(&self, user_id: Uuid) -> AppResult<Vec<Group>> {
        let rows = sqlx::query(
            r"
            SELECT g.* FROM user_groups g
            JOIN group_memberships m ON m.group_id = g.id
            WHERE m.user_id = $1
            ORDER BY g.name
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list user groups: {e}")))?;
        rows.iter().map(row_to_group).collect()
    }

    /// Save an edited group
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the new name is taken
    pub async fn update_group(&self, group: &Group) -> AppResult<()> {
        sqlx::query("UPDATE user_groups SET name = $1, description = $2, public = $3 WHERE id = $4")
            .bind(&group.name)
            .bind(&group.description)
            .bind(group.public)
            .bind(group.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(
                    e,
                    "A group with this name already exists",
                    "Failed to update group",
                )
            })?;
        Ok(())
    }

    /// Delete a group with its memberships and applications
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_group(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM user_groups WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete group: {e}")))?;
        Ok(())
    }

    // ================================================================================
    // Memberships
    // ================================================================================

    /// Members of a group in join order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_members(&self, group_id: Uuid) -> AppResult<Vec<Membership>> {
        let rows = sqlx::query(
            "SELECT * FROM group_memberships WHERE group_id = $1 ORDER BY created_at, rowid",
        )
        .bind(group_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list group members: {e}")))?;
        rows.iter().map(row_to_membership).collect()
    }

    /// Add a member
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the user is already a member
    pub async fn add_member(&self, group_id: Uuid, user_id: Uuid, admin: bool) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO group_memberships (group_id, user_id, admin, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(group_id.to_string())
        .bind(user_id.to_string())
        .bind(admin)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, "Already a member of this group", "Failed to add group member")
        })?;
        Ok(())
    }

    /// Remove the caller from a group, deleting the group with its last member
    ///
    /// The membership read, the decision and the write share one transaction.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for non-members and `ResourceConflict` when
    /// the last administrator leaves while other members remain
    pub async fn leave_group(&self, group_id: Uuid, user_id: Uuid) -> AppResult<LeaveOutcome> {
        let mut tx = self.begin().await?;
        let members = members_in(&mut tx, group_id).await?;
        let outcome = leave_decision(&members, user_id)?;

        match outcome {
            LeaveOutcome::Left => delete_membership(&mut tx, group_id, user_id).await?,
            LeaveOutcome::GroupDeleted => {
                sqlx::query("DELETE FROM user_groups WHERE id = $1")
                    .bind(group_id.to_string())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| AppError::database(format!("Failed to delete group: {e}")))?;
            }
        }

        commit(tx).await?;
        Ok(outcome)
    }

    /// Remove `target` on behalf of the administrator `admin_id`
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` unless `admin_id` administers the group,
    /// `ResourceNotFound` for non-members and `ResourceConflict` for the last
    /// administrator
    pub async fn remove_member(
        &self,
        group_id: Uuid,
        admin_id: Uuid,
        target: Uuid,
    ) -> AppResult<()> {
        let mut tx = self.begin().await?;
        let members = members_in(&mut tx, group_id).await?;
        require_admin(&members, admin_id)?;
        removal_decision(&members, target)?;
        delete_membership(&mut tx, group_id, target).await?;
        commit(tx).await
    }

    /// Grant or revoke administrator rights on behalf of `admin_id`
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` unless `admin_id` administers the group,
    /// `ResourceNotFound` for non-members and `ResourceConflict` when the last
    /// administrator would be demoted
    pub async fn set_admin(
        &self,
        group_id: Uuid,
        admin_id: Uuid,
        target: Uuid,
        admin: bool,
    ) -> AppResult<()> {
        let mut tx = self.begin().await?;
        let members = members_in(&mut tx, group_id).await?;
        require_admin(&members, admin_id)?;
        if admin {
            if !members.iter().any(|m| m.user_id == target) {
                return Err(AppError::not_found("Group member"));
            }
        } else {
            demote_decision(&members, target)?;
        }

        sqlx::query("UPDATE group_memberships SET admin = $1 WHERE group_id = $2 AND user_id = $3")
            .bind(admin)
            .bind(group_id.to_string())
            .bind(target.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to change member role: {e}")))?;
        commit(tx).await
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))
    }

    // ================================================================================
    // Applications
    // ================================================================================

    /// Pending applications of a group
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_applications(&self, group_id: Uuid) -> AppResult<Vec<GroupApplication>> {
        let rows = sqlx::query(
            "SELECT * FROM group_applications WHERE group_id = $1 ORDER BY created_at",
        )
        .bind(group_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list applications: {e}")))?;
        rows.iter().map(row_to_application).collect()
    }

    /// Whether the user has a pending application
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn has_application(&self, group_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM group_applications WHERE group_id = $1 AND user_id = $2",
        )
        .bind(group_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check application: {e}")))?;
        Ok(row.is_some())
    }

    /// File an application
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when one is already pending
    pub async fn create_application(&self, group_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO group_applications (group_id, user_id, created_at) VALUES ($1, $2, $3)",
        )
        .bind(group_id.to_string())
        .bind(user_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, "Application already pending", "Failed to create application")
        })?;
        Ok(())
    }

    /// Turn a pending application into a membership
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when no application is pending
    pub async fn accept_application(&self, group_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let result = sqlx::query(
            "DELETE FROM group_applications WHERE group_id = $1 AND user_id = $2",
        )
        .bind(group_id.to_string())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to remove application: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Application"));
        }

        sqlx::query(
            "INSERT OR IGNORE INTO group_memberships (group_id, user_id, admin, created_at) VALUES ($1, $2, 0, $3)",
        )
        .bind(group_id.to_string())
        .bind(user_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to add group member: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit membership: {e}")))
    }

    /// Drop a pending application
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when no application is pending
    pub async fn delete_application(&self, group_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM group_applications WHERE group_id = $1 AND user_id = $2",
        )
        .bind(group_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to remove application: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Application"));
        }
        Ok(())
    }
}

async fn members_in(conn: &mut SqliteConnection, group_id: Uuid) -> AppResult<Vec<Membership>> {
    let rows = sqlx::query(
        "SELECT * FROM group_memberships WHERE group_id = $1 ORDER BY created_at, rowid",
    )
    .bind(group_id.to_string())
    .fetch_all(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to list group members: {e}")))?;
    rows.iter().map(row_to_membership).collect()
}

async fn delete_membership(
    conn: &mut SqliteConnection,
    group_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM group_memberships WHERE group_id = $1 AND user_id = $2")
        .bind(group_id.to_string())
        .bind(user_id.to_string())
        .execute(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to remove group member: {e}")))?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Membership"));
    }
    Ok(())
}

async fn commit(tx: Transaction<'_, Sqlite>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit membership change: {e}")))
}

fn row_to_group(row: &SqliteRow) -> AppResult<Group> {
    let id: String = row.get("id");
    let creator_id: String = row.get("creator_id");
    let created_at: String = row.get("created_at");
    Ok(Group {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        description: row.get("description"),
        public: row.get("public"),
        creator_id: parse_uuid(&creator_id)?,
        gym_id: parse_optional_uuid(row.get("gym_id"))?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_membership(row: &SqliteRow) -> AppResult<Membership> {
    let group_id: String = row.get("group_id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    Ok(Membership {
        group_id: parse_uuid(&group_id)?,
        user_id: parse_uuid(&user_id)?,
        admin: row.get("admin"),
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_application(row: &SqliteRow) -> AppResult<GroupApplication> {
    let group_id: String = row.get("group_id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    Ok(GroupApplication {
        group_id: parse_uuid(&group_id)?,
        user_id: parse_uuid(&user_id)?,
        created_at: parse_timestamp(&created_at)?,
    })
}
