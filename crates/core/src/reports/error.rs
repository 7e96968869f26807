//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

use ifinance_shared::AppError;

/// Errors that can occur during report generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// The report needs a date the request left out.
    #[error("{report} requires {needs}")]
    MissingDate {
        /// Report display name.
        report: &'static str,
        /// Which dates are required.
        needs: &'static str,
    },
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        Self::Validation(err.to_string())
    }
}
