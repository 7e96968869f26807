//! Ledger error types.
//!
//! Every failure of the transaction engine maps to exactly one of five kinds,
//! each with a stable error code so API consumers can tell "fix your input"
//! apart from "not allowed" and "resubmit".

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use ifinance_shared::AppError;

use super::types::EntityKind;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or missing fields in the request.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Debits and credits of the submitted lines differ.
    #[error("Transaction is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debited amount.
        debit: Decimal,
        /// Total credited amount.
        credit: Decimal,
    },

    /// The principal does not own the referenced entity.
    #[error("{kind} {id} is not accessible to this user")]
    Unauthorized {
        /// Kind of entity that failed the ownership check.
        kind: EntityKind,
        /// Entity ID.
        id: Uuid,
    },

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of missing entity.
        kind: EntityKind,
        /// Entity ID.
        id: Uuid,
    },

    /// The underlying store failed mid-unit.
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl LedgerError {
    /// Shorthand for a missing entity.
    #[must_use]
    pub const fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// A posting would move an account's closing amount outside the
    /// storable range.
    #[must_use]
    pub fn closing_out_of_range(account_id: Uuid) -> Self {
        Self::ValidationError(format!(
            "closing amount of master account {account_id} would leave the storable range"
        ))
    }

    /// Shorthand for an ownership violation.
    #[must_use]
    pub const fn unauthorized(kind: EntityKind, id: Uuid) -> Self {
        Self::Unauthorized { kind, id }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError(_) => 400,
            Self::UnbalancedEntry { .. } => 422,
            Self::Unauthorized { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::StorageFailure(_) => 503,
        }
    }

    /// Returns true if the caller may resubmit the same request unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageFailure(_))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::ValidationError(_) => Self::Validation(message),
            LedgerError::UnbalancedEntry { .. } => Self::BusinessRule(message),
            LedgerError::Unauthorized { .. } => Self::Forbidden(message),
            LedgerError::NotFound { .. } => Self::NotFound(message),
            LedgerError::StorageFailure(_) => Self::Storage(message),
        }
    }
}
