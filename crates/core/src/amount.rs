//! Bounds on money amounts.
//!
//! Every stored amount is a `decimal(16,4)`: at most 4 decimal places and
//! 12 integer digits. Amounts from requests are checked against these limits
//! before any arithmetic or storage touches them.

use rust_decimal::Decimal;
use thiserror::Error;

/// Decimal places kept by stored amounts.
pub const AMOUNT_SCALE: u32 = 4;

/// Exclusive bound on the magnitude of a stored amount (10^12).
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// An amount the storage columns cannot hold exactly.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AmountError {
    /// More than [`AMOUNT_SCALE`] significant decimal places.
    #[error("amount {0} has more than 4 decimal places")]
    TooPrecise(Decimal),

    /// Magnitude at or above [`AMOUNT_LIMIT`], or arithmetic overflow.
    #[error("amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// Checks that an amount fits a stored amount column exactly.
///
/// Trailing zeros do not count towards the scale, so `1.50000` is accepted.
///
/// # Errors
///
/// Returns `TooPrecise` or `OutOfRange` for amounts the column would round
/// or reject.
pub fn check_amount(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount.abs() >= AMOUNT_LIMIT {
        return Err(AmountError::OutOfRange(amount));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(AmountError::TooPrecise(amount));
    }
    Ok(amount)
}

/// Adds two amounts, failing on overflow or a result outside the storable range.
///
/// # Errors
///
/// Returns `OutOfRange` if the sum overflows or reaches [`AMOUNT_LIMIT`].
pub fn checked_sum(a: Decimal, b: Decimal) -> Result<Decimal, AmountError> {
    let sum = a.checked_add(b).ok_or(AmountError::OutOfRange(a))?;
    check_amount(sum)
}
