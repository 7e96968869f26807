//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The database-backed ledger store
//! - Repository abstractions for data access
//! - Database migrations

pub mod entities;
pub mod ledger_store;
pub mod migration;
pub mod repositories;

pub use ledger_store::SeaOrmLedgerStore;
pub use repositories::{
    CategoryRepository, GroupRepository, MasterAccountRepository, ReportRepository,
    UserRepository,
};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use ifinance_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Opens a connection pool sized and timed by `config`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let timeout = Duration::from_secs(config.connect_timeout_secs);
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(false);

    Database::connect(options).await
}
