// ABOUTME: User account model
// ABOUTME: Login identity, role and activity timestamps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::permissions::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered or guest account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Unique login name
    pub username: String,
    /// Contact address, required for reminders
    pub email: Option<String>,
    /// bcrypt hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Role controlling gym and moderation rights
    pub role: UserRole,
    /// Deactivated users cannot log in
    pub is_active: bool,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Last successful authentication
    pub last_active: DateTime<Utc>,
}
