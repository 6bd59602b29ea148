// ABOUTME: Social group models
// ABOUTME: Group, Membership and pending GroupApplication rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User group, public or invitation based
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    /// Description
    pub description: String,
    /// Public groups can be joined directly, private ones need approval
    pub public: bool,
    /// Founding user
    pub creator_id: Uuid,
    /// Gym the group belongs to
    pub gym_id: Option<Uuid>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Group membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Group
    pub group_id: Uuid,
    /// Member
    pub user_id: Uuid,
    /// Administrators manage members and applications
    pub admin: bool,
    /// Join time
    pub created_at: DateTime<Utc>,
}

/// Pending request to join a private group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupApplication {
    /// Group
    pub group_id: Uuid,
    /// Applicant
    pub user_id: Uuid,
    /// Application time
    pub created_at: DateTime<Utc>,
}
