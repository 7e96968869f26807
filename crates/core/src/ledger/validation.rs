//! Request validation performed before a unit of work is opened.

use std::collections::HashSet;

use rust_decimal::Decimal;

use super::error::LedgerError;
use crate::amount::{check_amount, checked_sum};
use super::types::{LineInput, TransactionInput};

/// Debit and credit totals of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotals {
    /// Sum of debited amounts.
    pub debit: Decimal,
    /// Sum of credited amounts.
    pub credit: Decimal,
}

impl LineTotals {
    /// Sums the given lines.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if either total leaves the storable range.
    pub fn of(lines: &[LineInput]) -> Result<Self, LedgerError> {
        lines.iter().try_fold(
            Self {
                debit: Decimal::ZERO,
                credit: Decimal::ZERO,
            },
            |acc, line| {
                Ok(Self {
                    debit: checked_sum(acc.debit, line.debited_amount)
                        .map_err(|e| LedgerError::ValidationError(format!("debit total: {e}")))?,
                    credit: checked_sum(acc.credit, line.credited_amount)
                        .map_err(|e| LedgerError::ValidationError(format!("credit total: {e}")))?,
                })
            },
        )
    }

    /// Returns true if debits equal credits exactly.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }
}

/// Validates a transaction request.
///
/// Field errors are reported before the balance check, so a request with a
/// negative amount is a `ValidationError` even if it also fails to balance.
///
/// # Errors
///
/// - `ValidationError` for a blank description, an empty line list, a
///   negative amount, an amount with more than 4 decimal places or 12
///   integer digits, or a line ID repeated within the request.
/// - `UnbalancedEntry` if the debit total differs from the credit total.
pub fn validate_transaction(input: &TransactionInput) -> Result<LineTotals, LedgerError> {
    if input.description.trim().is_empty() {
        return Err(LedgerError::ValidationError(
            "description is required".to_string(),
        ));
    }

    if input.lines.is_empty() {
        return Err(LedgerError::ValidationError(
            "transaction must have at least one line".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for (index, line) in input.lines.iter().enumerate() {
        if line.debited_amount < Decimal::ZERO || line.credited_amount < Decimal::ZERO {
            return Err(LedgerError::ValidationError(format!(
                "line {} has a negative amount",
                index + 1
            )));
        }

        for amount in [line.debited_amount, line.credited_amount] {
            check_amount(amount).map_err(|e| {
                LedgerError::ValidationError(format!("line {}: {e}", index + 1))
            })?;
        }

        if let Some(id) = line.id
            && !seen.insert(id)
        {
            return Err(LedgerError::ValidationError(format!(
                "line {id} appears more than once"
            )));
        }
    }

    let totals = LineTotals::of(&input.lines)?;
    if !totals.is_balanced() {
        return Err(LedgerError::UnbalancedEntry {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}
