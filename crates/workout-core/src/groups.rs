// ABOUTME: Group membership workflow decisions
// ABOUTME: Join, leave, promotion and administration rules for public and private groups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Group workflow
//!
//! Public groups are joined directly. Private groups collect applications that
//! a group administrator accepts or declines. A group always keeps at least one
//! administrator while it has members; when the last member leaves the group is
//! removed.

use crate::errors::{AppError, AppResult};
use crate::models::{Group, Membership};
use uuid::Uuid;

/// Result of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Membership created
    Joined,
    /// Application recorded, waiting for approval
    Applied,
}

/// Decide what a join request does
///
/// # Errors
///
/// Returns a conflict when the user is already a member or already applied
pub fn join_decision(
    group: &Group,
    is_member: bool,
    has_application: bool,
) -> AppResult<JoinOutcome> {
    if is_member {
        return Err(AppError::conflict("You are already a member of this group"));
    }
    if group.public {
        return Ok(JoinOutcome::Joined);
    }
    if has_application {
        return Err(AppError::conflict(
            "You already applied to this group, please wait for an administrator",
        ));
    }
    Ok(JoinOutcome::Applied)
}

/// Result of a leave request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Membership removed
    Left,
    /// Last member left, the group is deleted
    GroupDeleted,
}

fn find(members: &[Membership], user_id: Uuid) -> Option<&Membership> {
    members.iter().find(|m| m.user_id == user_id)
}

fn admin_count(members: &[Membership]) -> usize {
    members.iter().filter(|m| m.admin).count()
}

/// Decide what happens when `user_id` leaves
///
/// # Errors
///
/// Returns not found for non-members and a conflict when the last
/// administrator leaves while other members remain
pub fn leave_decision(members: &[Membership], user_id: Uuid) -> AppResult<LeaveOutcome> {
    let membership = find(members, user_id)
        .ok_or_else(|| AppError::not_found("Group membership"))?;

    if members.len() == 1 {
        return Ok(LeaveOutcome::GroupDeleted);
    }

    if membership.admin && admin_count(members) == 1 {
        return Err(AppError::conflict(
            "You are the only administrator, promote another member before leaving",
        ));
    }

    Ok(LeaveOutcome::Left)
}

/// Fail unless `user_id` administers the group
///
/// # Errors
///
/// Returns `PermissionDenied` for non-administrators
pub fn require_admin(members: &[Membership], user_id: Uuid) -> AppResult<()> {
    if find(members, user_id).is_some_and(|m| m.admin) {
        Ok(())
    } else {
        Err(AppError::permission_denied(
            "Only group administrators may perform this action",
        ))
    }
}

/// Check that `target` may lose administrator rights
///
/// # Errors
///
/// Returns not found for non-members and a conflict for the last administrator
pub fn demote_decision(members: &[Membership], target: Uuid) -> AppResult<()> {
    let membership = find(members, target).ok_or_else(|| AppError::not_found("Group member"))?;
    if membership.admin && admin_count(members) == 1 {
        return Err(AppError::conflict(
            "The group needs at least one administrator",
        ));
    }
    Ok(())
}

/// Check that `target` may be removed by an administrator
///
/// # Errors
///
/// Returns not found for non-members and a conflict when the target is the
/// last administrator
pub fn removal_decision(members: &[Membership], target: Uuid) -> AppResult<()> {
    demote_decision(members, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use chrono::Utc;

    fn group(public: bool) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: "Runners".to_owned(),
            description: String::new(),
            public,
            creator_id: Uuid::new_v4(),
            gym_id: None,
            created_at: Utc::now(),
        }
    }

    fn member(group_id: Uuid, admin: bool) -> Membership {
        Membership {
            group_id,
            user_id: Uuid::new_v4(),
            admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_group_joins_directly() {
        assert_eq!(
            join_decision(&group(true), false, false).unwrap(),
            JoinOutcome::Joined
        );
    }

    #[test]
    fn test_private_group_requires_application() {
        let g = group(false);
        assert_eq!(join_decision(&g, false, false).unwrap(), JoinOutcome::Applied);
        assert_eq!(
            join_decision(&g, false, true).unwrap_err().code,
            ErrorCode::ResourceConflict
        );
        assert!(join_decision(&g, true, false).is_err());
    }

    #[test]
    fn test_last_admin_cannot_leave() {
        let g = group(true);
        let admin = member(g.id, true);
        let other = member(g.id, false);
        let members = vec![admin.clone(), other.clone()];

        assert!(leave_decision(&members, admin.user_id).is_err());
        assert_eq!(
            leave_decision(&members, other.user_id).unwrap(),
            LeaveOutcome::Left
        );
        assert_eq!(
            leave_decision(&[admin.clone()], admin.user_id).unwrap(),
            LeaveOutcome::GroupDeleted
        );
        assert!(leave_decision(&members, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_admin_checks() {
        let g = group(false);
        let admin = member(g.id, true);
        let second_admin = member(g.id, true);
        let other = member(g.id, false);

        assert!(require_admin(&[admin.clone(), other.clone()], admin.user_id).is_ok());
        assert!(require_admin(&[admin.clone(), other.clone()], other.user_id).is_err());

        assert!(demote_decision(&[admin.clone(), other.clone()], admin.user_id).is_err());
        let members = [admin.clone(), second_admin, other.clone()];
        assert!(demote_decision(&members, admin.user_id).is_ok());
        assert!(removal_decision(&[admin, other.clone()], other.user_id).is_ok());
    }
}
