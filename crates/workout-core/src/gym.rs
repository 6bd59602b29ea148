// ABOUTME: Gym membership rules
// ABOUTME: Member inactivity evaluation and contract validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::errors::{AppError, AppResult};
use crate::models::Contract;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a member counts as inactive
///
/// Members who never trained, or whose last log or session is older than
/// `weeks_inactive` weeks, are inactive.
#[must_use]
pub fn is_inactive(
    last_activity: Option<NaiveDate>,
    today: NaiveDate,
    weeks_inactive: u32,
) -> bool {
    last_activity.is_none_or(|last| today - last > Duration::weeks(i64::from(weeks_inactive)))
}

/// Member row of the gym overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberActivity {
    /// Member
    pub user_id: Uuid,
    /// Login name
    pub username: String,
    /// Last workout log or session date
    pub last_activity: Option<NaiveDate>,
    /// Result of [`is_inactive`]
    pub inactive: bool,
    /// Member opted into inactivity reports
    pub include_inactive: bool,
}

/// Check contract values before saving
///
/// # Errors
///
/// Returns a validation error for a negative amount or an end date before the
/// start date
pub fn validate_contract(contract: &Contract) -> AppResult<()> {
    if !contract.amount.is_finite() || contract.amount < 0.0 {
        return Err(AppError::invalid_field(
            "amount",
            "The contract amount cannot be negative",
        ));
    }

    if contract
        .date_end
        .is_some_and(|end| end < contract.date_start)
    {
        return Err(AppError::invalid_field(
            "date_end",
            "The end date cannot be before the start date",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentInterval;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_inactivity_window() {
        let today = date(2024, 3, 29);
        assert!(is_inactive(None, today, 4));
        assert!(!is_inactive(Some(date(2024, 3, 1)), today, 4));
        assert!(is_inactive(Some(date(2024, 2, 29)), today, 4));
    }

    #[test]
    fn test_contract_dates() {
        let mut contract = Contract {
            id: Uuid::new_v4(),
            gym_id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            contract_type_id: None,
            options: vec![],
            amount: 29.9,
            payment: PaymentInterval::Monthly,
            is_active: true,
            date_start: date(2024, 1, 1),
            date_end: Some(date(2024, 12, 31)),
            email: None,
            zip_code: None,
            city: None,
            street: None,
            phone: None,
            profession: None,
            note: None,
            created_at: Utc::now(),
        };
        assert!(validate_contract(&contract).is_ok());

        contract.date_end = Some(date(2023, 12, 31));
        assert!(validate_contract(&contract).is_err());

        contract.date_end = None;
        contract.amount = -1.0;
        assert!(validate_contract(&contract).is_err());
    }
}
