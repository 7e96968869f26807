//! Double-entry bookkeeping logic.
//!
//! This module implements the ledger core:
//! - Domain types for transactions, lines and accounts
//! - Request validation (field rules and debit/credit balance)
//! - Balance projection from line deltas
//! - Line reconciliation for updates
//! - Storage and ownership traits
//! - The transaction engine

pub mod balance;
pub mod engine;
pub mod error;
pub mod reconcile;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod engine_props;
#[cfg(test)]
mod memory;
#[cfg(test)]
mod engine_tests;

pub use balance::{BalanceProjector, line_delta, projected_closing};
pub use engine::TransactionEngine;
pub use error::LedgerError;
pub use reconcile::{LinePlan, plan_line_changes};
pub use store::{LedgerStore, OwnershipGuard};
pub use types::*;
pub use validation::{LineTotals, validate_transaction};
