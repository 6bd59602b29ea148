// ABOUTME: Role-based permission system using bitflags
// ABOUTME: Maps user roles to permissions and decides access to other users' data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Permissions
//!
//! Two questions are answered here. *What may this role do?* is encoded as
//! [`Permissions`] bitflags derived from [`UserRole`]. *May this user see or
//! change that user's data?* is answered by [`Access::evaluate`], which looks at
//! ownership, the owner's read-only sharing flag and gym staff relationships.

use crate::errors::{AppError, AppResult};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

bitflags! {
    /// Capabilities granted to a role
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Permissions: u32 {
        /// Create and edit the user's own workouts, plans and entries
        const MANAGE_OWN_DATA = 0b0000_0001;
        /// Read data of members of the trainer's gym
        const GYM_TRAINER = 0b0000_0010;
        /// Manage members, notes and contracts of the user's gym
        const MANAGE_GYM = 0b0000_0100;
        /// Manage every gym
        const MANAGE_GYMS = 0b0000_1000;
        /// Accept, edit and delete catalogue exercises
        const MANAGE_EXERCISES = 0b0001_0000;
        /// Accept, edit and delete catalogue ingredients
        const MANAGE_INGREDIENTS = 0b0010_0000;
    }
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular member
    #[default]
    User,
    /// Gym trainer with read access to members
    Trainer,
    /// Manager of one gym
    GymManager,
    /// Manager of all gyms
    GeneralManager,
    /// Site administrator
    Admin,
}

impl UserRole {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Trainer => "trainer",
            Self::GymManager => "gym_manager",
            Self::GeneralManager => "general_manager",
            Self::Admin => "admin",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "trainer" => Self::Trainer,
            "gym_manager" => Self::GymManager,
            "general_manager" => Self::GeneralManager,
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    /// Permissions granted to the role
    #[must_use]
    pub const fn permissions(&self) -> Permissions {
        match self {
            Self::User => Permissions::MANAGE_OWN_DATA,
            Self::Trainer => Permissions::MANAGE_OWN_DATA.union(Permissions::GYM_TRAINER),
            Self::GymManager => Permissions::MANAGE_OWN_DATA
                .union(Permissions::GYM_TRAINER)
                .union(Permissions::MANAGE_GYM),
            Self::GeneralManager => Permissions::MANAGE_OWN_DATA
                .union(Permissions::GYM_TRAINER)
                .union(Permissions::MANAGE_GYM)
                .union(Permissions::MANAGE_GYMS),
            Self::Admin => Permissions::all(),
        }
    }

    /// Whether the role includes every bit of `permission`
    #[must_use]
    pub const fn has(&self, permission: Permissions) -> bool {
        self.permissions().contains(permission)
    }
}

/// The authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// User ID
    pub user_id: Uuid,
    /// Role
    pub role: UserRole,
    /// Gym from the caller's profile
    pub gym_id: Option<Uuid>,
}

impl Principal {
    /// Whether the caller holds `permission`
    #[must_use]
    pub const fn has(&self, permission: Permissions) -> bool {
        self.role.has(permission)
    }

    /// Fail with 403 unless the caller holds `permission`
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the role lacks the permission
    pub fn require(&self, permission: Permissions) -> AppResult<()> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AppError::permission_denied(format!(
                "Role '{}' is not allowed to perform this action",
                self.role.as_str()
            )))
        }
    }

    /// Whether the caller may manage the given gym
    #[must_use]
    pub fn can_manage_gym(&self, gym_id: Uuid) -> bool {
        self.has(Permissions::MANAGE_GYMS)
            || (self.has(Permissions::MANAGE_GYM) && self.gym_id == Some(gym_id))
    }

    /// Whether the caller may see the members of the given gym
    #[must_use]
    pub fn can_view_gym(&self, gym_id: Uuid) -> bool {
        self.can_manage_gym(gym_id)
            || (self.has(Permissions::GYM_TRAINER) && self.gym_id == Some(gym_id))
    }

    /// Fail with 403 unless the caller may manage the gym
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the caller is not staff of the gym
    pub fn require_gym_manager(&self, gym_id: Uuid) -> AppResult<()> {
        if self.can_manage_gym(gym_id) {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "Only managers of this gym may perform this action",
            ))
        }
    }

    /// Fail with 403 unless the caller may see the gym's members
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the caller is not staff of the gym
    pub fn require_gym_staff(&self, gym_id: Uuid) -> AppResult<()> {
        if self.can_view_gym(gym_id) {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "Only trainers and managers of this gym may perform this action",
            ))
        }
    }
}

/// Ownership facts about a piece of data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataOwner {
    /// Owning user
    pub user_id: Uuid,
    /// Owner's gym
    pub gym_id: Option<Uuid>,
    /// Owner shares their data read-only
    pub ro_access: bool,
}

/// Access level of a caller on someone's data
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Access {
    /// No access
    Denied,
    /// May read
    ReadOnly,
    /// May read and write
    Full,
}

impl Access {
    /// Decide the access level of `principal` on data owned by `owner`
    #[must_use]
    pub fn evaluate(principal: &Principal, owner: &DataOwner) -> Self {
        if principal.user_id == owner.user_id {
            return Self::Full;
        }

        if principal.has(Permissions::MANAGE_GYMS) {
            return Self::ReadOnly;
        }

        let same_gym = owner.gym_id.is_some() && principal.gym_id == owner.gym_id;
        if same_gym && principal.has(Permissions::GYM_TRAINER) {
            return Self::ReadOnly;
        }

        if owner.ro_access {
            return Self::ReadOnly;
        }

        Self::Denied
    }

    /// Fail unless reading is allowed
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for `Denied`
    pub fn require_read(self) -> AppResult<()> {
        if self >= Self::ReadOnly {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "You do not have access to this user's data",
            ))
        }
    }

    /// Fail unless writing is allowed
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for anything below `Full`
    pub fn require_write(self) -> AppResult<()> {
        if self == Self::Full {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "Only the owner may modify this data",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn principal(role: UserRole, gym_id: Option<Uuid>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            role,
            gym_id,
        }
    }

    fn owner(gym_id: Option<Uuid>, ro_access: bool) -> DataOwner {
        DataOwner {
            user_id: Uuid::new_v4(),
            gym_id,
            ro_access,
        }
    }

    #[test]
    fn test_role_permissions_are_cumulative() {
        assert!(!UserRole::User.has(Permissions::GYM_TRAINER));
        assert!(UserRole::Trainer.has(Permissions::GYM_TRAINER));
        assert!(!UserRole::Trainer.has(Permissions::MANAGE_GYM));
        assert!(UserRole::GymManager.has(Permissions::MANAGE_GYM | Permissions::GYM_TRAINER));
        assert!(UserRole::GeneralManager.has(Permissions::MANAGE_GYMS));
        assert!(!UserRole::GeneralManager.has(Permissions::MANAGE_EXERCISES));
        assert_eq!(UserRole::Admin.permissions(), Permissions::all());
    }

    #[test]
    fn test_role_round_trips_through_database_strings() {
        for role in [
            UserRole::User,
            UserRole::Trainer,
            UserRole::GymManager,
            UserRole::GeneralManager,
            UserRole::Admin,
        ] {
            assert_eq!(UserRole::parse(role.as_str()), role);
        }
        assert_eq!(UserRole::parse("unknown"), UserRole::User);
    }

    #[test]
    fn test_owner_has_full_access() {
        let me = principal(UserRole::User, None);
        let mine = DataOwner {
            user_id: me.user_id,
            gym_id: None,
            ro_access: false,
        };
        assert_eq!(Access::evaluate(&me, &mine), Access::Full);
    }

    #[test]
    fn test_stranger_is_denied_unless_shared() {
        let stranger = principal(UserRole::User, None);
        assert_eq!(
            Access::evaluate(&stranger, &owner(None, false)),
            Access::Denied
        );
        assert_eq!(
            Access::evaluate(&stranger, &owner(None, true)),
            Access::ReadOnly
        );
    }

    #[test]
    fn test_trainer_reads_members_of_own_gym_only() {
        let gym = Uuid::new_v4();
        let trainer = principal(UserRole::Trainer, Some(gym));

        assert_eq!(
            Access::evaluate(&trainer, &owner(Some(gym), false)),
            Access::ReadOnly
        );
        assert_eq!(
            Access::evaluate(&trainer, &owner(Some(Uuid::new_v4()), false)),
            Access::Denied
        );
        assert_eq!(
            Access::evaluate(&trainer, &owner(None, false)),
            Access::Denied
        );
    }

    #[test]
    fn test_regular_user_in_same_gym_is_denied() {
        let gym = Uuid::new_v4();
        let member = principal(UserRole::User, Some(gym));
        assert_eq!(
            Access::evaluate(&member, &owner(Some(gym), false)),
            Access::Denied
        );
    }

    #[test]
    fn test_read_only_cannot_write() {
        let err = Access::ReadOnly.require_write().unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert!(Access::ReadOnly.require_read().is_ok());
        assert!(Access::Denied.require_read().is_err());
    }

    #[test]
    fn test_gym_management_scope() {
        let gym = Uuid::new_v4();
        let other = Uuid::new_v4();

        let manager = principal(UserRole::GymManager, Some(gym));
        assert!(manager.can_manage_gym(gym));
        assert!(!manager.can_manage_gym(other));

        let trainer = principal(UserRole::Trainer, Some(gym));
        assert!(!trainer.can_manage_gym(gym));
        assert!(trainer.can_view_gym(gym));

        let general = principal(UserRole::GeneralManager, None);
        assert!(general.can_manage_gym(other));
    }
}
