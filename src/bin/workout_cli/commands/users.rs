// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors
// ABOUTME: Account commands for workout-cli
// ABOUTME: Creates or promotes administrators and removes expired guest accounts

use crate::helpers::display::{display_admin_created, display_temporary_cleanup};
use anyhow::{bail, Result};
use chrono::{Duration, Utc};
use tracing::info;
use workout_manager::{
    auth::{generate_jwt_secret, AuthManager},
    config::ServerConfig,
    constants::MIN_PASSWORD_LENGTH,
    database::{users::NewUser, Database},
    logging::AppLogger,
};
use workout_core::permissions::UserRole;

/// Create an administrator, or promote an existing account with `force`
pub async fn create_admin(
    database: &Database,
    config: &ServerConfig,
    username: String,
    email: Option<String>,
    password: String,
    force: bool,
) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        bail!("Password must be at least {MIN_PASSWORD_LENGTH} characters long");
    }

    let users = database.users();
    if let Some(existing) = users.get_user_by_login(&username).await? {
        if !force {
            bail!("User '{username}' already exists, use --force to promote it");
        }
        users.set_role(existing.id, UserRole::Admin).await?;
        info!(user_id = %existing.id, "Promoted existing user to admin");
        display_admin_created(&existing.username, existing.email.as_deref(), false);
        return Ok(());
    }

    // Only the bcrypt cost matters here, the signing secret is never used
    let auth_manager = AuthManager::new(
        generate_jwt_secret().as_bytes(),
        config.auth.jwt_expiry_hours,
        config.auth.bcrypt_cost,
    );
    let password_hash = auth_manager.hash_password(&password).await?;

    let user = users
        .create_user(&NewUser {
            username,
            email,
            password_hash,
            role: UserRole::Admin,
            is_temporary: false,
        })
        .await?;
    AppLogger::log_auth_event(&user.id.to_string(), "create_admin", true, None);
    display_admin_created(&user.username, user.email.as_deref(), true);
    Ok(())
}

/// Delete guest accounts created more than `max_age_days` ago
pub async fn delete_temporary(database: &Database, max_age_days: i64) -> Result<()> {
    if max_age_days < 0 {
        bail!("--max-age-days cannot be negative");
    }
    let cutoff = Utc::now() - Duration::days(max_age_days);
    let deleted = database.users().delete_temporary_users(cutoff).await?;
    let count = usize::try_from(deleted).unwrap_or(usize::MAX);
    AppLogger::log_job_run("delete-temp-users", count, count);
    display_temporary_cleanup(deleted, max_age_days);
    Ok(())
}
