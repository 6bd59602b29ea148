// ABOUTME: Gym organization models
// ABOUTME: Gym, per-gym configuration, admin notes, contract types/options and contracts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gym or training organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gym {
    /// Unique identifier
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    /// Phone number
    pub phone: Option<String>,
    /// Contact address
    pub email: Option<String>,
    /// Owner or operator
    pub owner: Option<String>,
    /// Postal code
    pub zip_code: Option<String>,
    /// City
    pub city: Option<String>,
    /// Street
    pub street: Option<String>,
}

/// Gym-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymConfig {
    /// Gym
    pub gym_id: Uuid,
    /// Weeks without logs before a member is considered inactive
    pub weeks_inactive: u32,
}

/// Per-manager dashboard settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymAdminConfig {
    /// Manager or trainer
    pub user_id: Uuid,
    /// Gym
    pub gym_id: Uuid,
    /// Show the inactive member overview
    pub overview_inactive: bool,
}

/// Per-member settings managed by the gym
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymUserConfig {
    /// Member
    pub user_id: Uuid,
    /// Gym
    pub gym_id: Uuid,
    /// Include the member in inactivity reports
    pub include_inactive: bool,
}

/// Private note about a member, visible to gym staff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserNote {
    /// Unique identifier
    pub id: Uuid,
    /// Member the note is about
    pub member_id: Uuid,
    /// Staff member who wrote the note
    pub author_id: Uuid,
    /// Note text
    pub note: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last edit time
    pub edited_at: DateTime<Utc>,
    /// Staff member who edited the note last
    pub edited_by: Uuid,
}

/// Kind of contract a gym offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractType {
    /// Unique identifier
    pub id: Uuid,
    /// Gym
    pub gym_id: Uuid,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
}

/// Optional add-on for contracts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractOption {
    /// Unique identifier
    pub id: Uuid,
    /// Gym
    pub gym_id: Uuid,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
}

/// How often a contract amount is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentInterval {
    /// Single payment
    Once,
    /// Every day
    Daily,
    /// Every week
    Weekly,
    /// Every month
    #[default]
    Monthly,
    /// Every year
    Yearly,
}

impl PaymentInterval {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "once" => Self::Once,
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "yearly" => Self::Yearly,
            _ => Self::Monthly,
        }
    }
}

/// Membership contract between a gym and a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Unique identifier
    pub id: Uuid,
    /// Gym
    pub gym_id: Uuid,
    /// Member
    pub member_id: Uuid,
    /// Staff member who created the contract
    pub author_id: Uuid,
    /// Contract type
    pub contract_type_id: Option<Uuid>,
    /// Selected options
    pub options: Vec<Uuid>,
    /// Amount charged per interval
    pub amount: f64,
    /// Charge interval
    pub payment: PaymentInterval,
    /// Currently in effect
    pub is_active: bool,
    /// First day
    pub date_start: NaiveDate,
    /// Last day, open ended when absent
    pub date_end: Option<NaiveDate>,
    /// Contact address at signing
    pub email: Option<String>,
    /// Postal code
    pub zip_code: Option<String>,
    /// City
    pub city: Option<String>,
    /// Street
    pub street: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Member profession
    pub profession: Option<String>,
    /// Free text note
    pub note: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}
