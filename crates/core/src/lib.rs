//! Core business logic for iFinance.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry transaction engine and balance projection
//! - `chart` - Chart-of-accounts rules
//! - `amount` - Storable range of money amounts
//! - `reports` - Trial balance, balance sheet, profit and loss, cash flow
//! - `auth` - Roles and password hashing

pub mod amount;
pub mod auth;
pub mod chart;
pub mod ledger;
pub mod reports;
