//! Report data loading.
//!
//! Pulls an owner's accounts and dated lines from committed state; the
//! arithmetic lives in `ifinance_core::reports`.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use ifinance_core::reports::{
    Report, ReportAccount, ReportError, ReportLine, ReportRequest, ReportService, ReportType,
};

use crate::entities::{master_accounts, transaction_lines, transactions};

/// Error types for report generation.
#[derive(Debug, thiserror::Error)]
pub enum ReportRepositoryError {
    /// The request is invalid.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads an owner's accounts ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn accounts(&self, owner_id: Uuid) -> Result<Vec<ReportAccount>, DbErr> {
        let accounts = master_accounts::Entity::find()
            .filter(master_accounts::Column::OwnerId.eq(owner_id))
            .order_by_asc(master_accounts::Column::Name)
            .all(&self.db)
            .await?;

        Ok(accounts
            .into_iter()
            .map(|a| ReportAccount {
                id: a.id,
                name: a.name,
            })
            .collect())
    }

    /// Loads an owner's lines dated on or before `until`, or all of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn lines(
        &self,
        owner_id: Uuid,
        until: Option<NaiveDate>,
    ) -> Result<Vec<ReportLine>, DbErr> {
        let mut query = transaction_lines::Entity::find()
            .find_also_related(transactions::Entity)
            .filter(transactions::Column::OwnerId.eq(owner_id));
        if let Some(until) = until {
            query = query.filter(transactions::Column::Date.lte(until));
        }

        let rows = query.all(&self.db).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(line, transaction)| {
                transaction.map(|t| ReportLine {
                    account_id: line.master_account_id,
                    date: t.date,
                    debited_amount: line.debited_amount,
                    credited_amount: line.credited_amount,
                })
            })
            .collect())
    }

    /// Generates a report over an owner's committed books.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid or a query fails.
    pub async fn generate(
        &self,
        owner_id: Uuid,
        request: &ReportRequest,
    ) -> Result<Report, ReportRepositoryError> {
        let accounts = self.accounts(owner_id).await?;
        let until = match request.report_type {
            ReportType::BalanceSheet => request.as_of_date.or(request.end_date),
            _ => request.start_date.and(request.end_date),
        };
        let lines = self.lines(owner_id, until).await?;

        Ok(ReportService::generate(request, &accounts, &lines)?)
    }
}
