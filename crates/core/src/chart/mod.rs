//! Chart-of-accounts rules: categories, groups and master accounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::amount::{AmountError, check_amount, checked_sum};

/// Side on which a category's balances naturally grow.
///
/// - Debit-normal (assets, expenses): balance grows with debit − credit
/// - Credit-normal (liabilities, income): balance grows with credit − debit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal.
    Debit,
    /// Credit-normal.
    Credit,
}

impl NormalBalance {
    /// Returns the stored name of this side.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Balance change of an entry, signed so that growth on the normal side is positive.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

impl std::str::FromStr for NormalBalance {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(ChartError::UnknownNormalBalance(other.to_string())),
        }
    }
}

/// Violations of chart-of-accounts rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    /// Name is empty after trimming.
    #[error("name is required")]
    BlankName,

    /// A group was made its own parent.
    #[error("group {0} cannot be its own parent")]
    SelfParent(Uuid),

    /// Normal balance is neither debit nor credit.
    #[error("unknown normal balance: {0}")]
    UnknownNormalBalance(String),

    /// Opening or closing amount outside the storable range.
    #[error("{0}")]
    Amount(#[from] AmountError),
}

/// Trims a name and rejects it if nothing is left.
///
/// # Errors
///
/// Returns `ChartError::BlankName` for empty or whitespace-only names.
pub fn normalize_name(name: &str) -> Result<String, ChartError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ChartError::BlankName)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Rejects a group whose parent is itself.
///
/// Deeper cycles are not detected.
///
/// # Errors
///
/// Returns `ChartError::SelfParent` when `group_id == parent_id`.
pub fn check_parent(group_id: Uuid, parent_id: Option<Uuid>) -> Result<(), ChartError> {
    match parent_id {
        Some(parent) if parent == group_id => Err(ChartError::SelfParent(group_id)),
        _ => Ok(()),
    }
}

/// Checks an opening amount taken from a request.
///
/// # Errors
///
/// Returns `ChartError::Amount` if the amount cannot be stored exactly.
pub fn check_opening(amount: Decimal) -> Result<Decimal, ChartError> {
    Ok(check_amount(amount)?)
}

/// New closing amount after an opening amount edit.
///
/// The closing amount moves by the same difference so it keeps equalling
/// the opening amount plus the attached lines' deltas.
///
/// # Errors
///
/// Returns `ChartError::Amount` if the new opening amount or the rebased
/// closing amount cannot be stored.
pub fn rebase_closing(
    old_opening: Decimal,
    new_opening: Decimal,
    closing: Decimal,
) -> Result<Decimal, ChartError> {
    let new_opening = check_opening(new_opening)?;
    let shift = new_opening
        .checked_sub(old_opening)
        .ok_or(AmountError::OutOfRange(new_opening))?;
    Ok(checked_sum(closing, shift)?)
}
