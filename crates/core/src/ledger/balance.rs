//! Balance projection.
//!
//! An account's closing amount is its opening amount plus
//! `debited − credited` for every attached line. The projector turns line
//! mutations into balance adjustments on the store.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::store::LedgerStore;
use super::types::{AccountRecord, LineFields, LineRecord};

/// Signed contribution of a line to its account's closing amount.
#[must_use]
pub fn line_delta(debited: Decimal, credited: Decimal) -> Decimal {
    debited - credited
}

/// Closing amount implied by an opening amount and the attached lines.
#[must_use]
pub fn projected_closing<'a, I>(opening: Decimal, lines: I) -> Decimal
where
    I: IntoIterator<Item = &'a LineRecord>,
{
    lines
        .into_iter()
        .fold(opening, |acc, l| acc + line_delta(l.debited_amount, l.credited_amount))
}

/// Keeps account balances in step with line mutations.
#[derive(Debug)]
pub struct BalanceProjector<'s, S> {
    store: &'s S,
}

impl<'s, S: LedgerStore> BalanceProjector<'s, S> {
    /// Creates a projector writing through `store`.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Adds a line's delta to its account.
    pub async fn apply_line(
        &self,
        unit: &mut S::Unit,
        account_id: Uuid,
        debited: Decimal,
        credited: Decimal,
    ) -> Result<AccountRecord, LedgerError> {
        self.store
            .adjust_account_balance(unit, account_id, line_delta(debited, credited))
            .await
    }

    /// Removes a line's delta from its account.
    pub async fn reverse_line(
        &self,
        unit: &mut S::Unit,
        account_id: Uuid,
        debited: Decimal,
        credited: Decimal,
    ) -> Result<AccountRecord, LedgerError> {
        self.store
            .adjust_account_balance(unit, account_id, -line_delta(debited, credited))
            .await
    }

    /// Applies new line fields.
    pub async fn apply(
        &self,
        unit: &mut S::Unit,
        fields: &LineFields,
    ) -> Result<AccountRecord, LedgerError> {
        self.apply_line(
            unit,
            fields.master_account_id,
            fields.debited_amount,
            fields.credited_amount,
        )
        .await
    }

    /// Reverses a stored line.
    pub async fn reverse(
        &self,
        unit: &mut S::Unit,
        line: &LineRecord,
    ) -> Result<AccountRecord, LedgerError> {
        self.reverse_line(
            unit,
            line.master_account_id,
            line.debited_amount,
            line.credited_amount,
        )
        .await
    }
}
