//! Financial report generation.
//!
//! This module provides pure business logic for generating financial reports:
//! - Trial Balance
//! - Balance Sheet
//! - Profit and Loss Statement
//! - Cash Flow Statement

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
