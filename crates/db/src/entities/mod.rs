//! `SeaORM` entity definitions.

pub mod account_categories;
pub mod groups;
pub mod master_accounts;
pub mod sea_orm_active_enums;
pub mod transaction_lines;
pub mod transactions;
pub mod users;
