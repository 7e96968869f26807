//! Database-backed ledger store.
//!
//! A unit of work is a `SeaORM` [`DatabaseTransaction`]; every read and write
//! the engine makes inside a unit goes through it, so the whole operation
//! commits or rolls back as one database transaction.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use ifinance_core::amount::AMOUNT_LIMIT;
use ifinance_core::ledger::{
    AccountRecord, EntityKind, LedgerError, LedgerStore, LineFields, LineRecord, OwnershipGuard,
    TransactionHeader, TransactionRecord, TransactionWithLines,
};

use crate::entities::{groups, master_accounts, transaction_lines, transactions};

impl From<transactions::Model> for TransactionRecord {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            date: model.date,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<transaction_lines::Model> for LineRecord {
    fn from(model: transaction_lines::Model) -> Self {
        Self {
            id: model.id,
            transaction_id: model.transaction_id,
            master_account_id: model.master_account_id,
            debited_amount: model.debited_amount,
            credited_amount: model.credited_amount,
            comment: model.comment,
        }
    }
}

impl From<master_accounts::Model> for AccountRecord {
    fn from(model: master_accounts::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            opening_amount: model.opening_amount,
            closing_amount: model.closing_amount,
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn storage(err: DbErr) -> LedgerError {
    LedgerError::StorageFailure(err.to_string())
}

/// Ledger store over a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct SeaOrmLedgerStore {
    db: DatabaseConnection,
}

impl SeaOrmLedgerStore {
    /// Creates a new store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn require_account(
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<master_accounts::Model, LedgerError> {
        master_accounts::Entity::find_by_id(id)
            .one(txn)
            .await
            .map_err(storage)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::MasterAccount, id))
    }

    async fn attach_lines(
        &self,
        headers: Vec<transactions::Model>,
    ) -> Result<Vec<TransactionWithLines>, LedgerError> {
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let lines = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::TransactionId.is_in(ids))
            .order_by_asc(transaction_lines::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?;

        let mut by_transaction: HashMap<Uuid, Vec<LineRecord>> = HashMap::new();
        for line in lines {
            by_transaction
                .entry(line.transaction_id)
                .or_default()
                .push(line.into());
        }

        Ok(headers
            .into_iter()
            .map(|header| TransactionWithLines {
                lines: by_transaction.remove(&header.id).unwrap_or_default(),
                transaction: header.into(),
            })
            .collect())
    }
}

impl LedgerStore for SeaOrmLedgerStore {
    type Unit = DatabaseTransaction;

    async fn begin_unit(&self) -> Result<DatabaseTransaction, LedgerError> {
        self.db.begin().await.map_err(storage)
    }

    async fn commit(&self, unit: DatabaseTransaction) -> Result<(), LedgerError> {
        unit.commit().await.map_err(storage)
    }

    async fn rollback(&self, unit: DatabaseTransaction) -> Result<(), LedgerError> {
        unit.rollback().await.map_err(storage)
    }

    async fn create_transaction(
        &self,
        unit: &mut DatabaseTransaction,
        owner_id: Uuid,
        header: &TransactionHeader,
    ) -> Result<TransactionRecord, LedgerError> {
        let now = Utc::now();
        let model = transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner_id),
            date: Set(header.date),
            description: Set(header.description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = model.insert(&*unit).await.map_err(storage)?;
        Ok(model.into())
    }

    async fn update_transaction_header(
        &self,
        unit: &mut DatabaseTransaction,
        id: Uuid,
        header: &TransactionHeader,
    ) -> Result<TransactionRecord, LedgerError> {
        let existing = transactions::Entity::find_by_id(id)
            .one(&*unit)
            .await
            .map_err(storage)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Transaction, id))?;

        let mut active: transactions::ActiveModel = existing.into();
        active.date = Set(header.date);
        active.description = Set(header.description.clone());
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*unit).await.map_err(storage)?;
        Ok(updated.into())
    }

    async fn delete_transaction(
        &self,
        unit: &mut DatabaseTransaction,
        id: Uuid,
    ) -> Result<(), LedgerError> {
        let result = transactions::Entity::delete_by_id(id)
            .exec(&*unit)
            .await
            .map_err(storage)?;
        if result.rows_affected == 0 {
            return Err(LedgerError::not_found(EntityKind::Transaction, id));
        }
        Ok(())
    }

    async fn get_transaction(
        &self,
        unit: &mut DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        let model = transactions::Entity::find_by_id(id)
            .one(&*unit)
            .await
            .map_err(storage)?;
        Ok(model.map(Into::into))
    }

    async fn create_line(
        &self,
        unit: &mut DatabaseTransaction,
        transaction_id: Uuid,
        fields: &LineFields,
    ) -> Result<LineRecord, LedgerError> {
        if transactions::Entity::find_by_id(transaction_id)
            .one(&*unit)
            .await
            .map_err(storage)?
            .is_none()
        {
            return Err(LedgerError::not_found(
                EntityKind::Transaction,
                transaction_id,
            ));
        }
        Self::require_account(unit, fields.master_account_id).await?;

        let model = transaction_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_id: Set(transaction_id),
            master_account_id: Set(fields.master_account_id),
            debited_amount: Set(fields.debited_amount),
            credited_amount: Set(fields.credited_amount),
            comment: Set(fields.comment.clone()),
        };
        let model = model.insert(&*unit).await.map_err(storage)?;
        Ok(model.into())
    }

    async fn update_line(
        &self,
        unit: &mut DatabaseTransaction,
        id: Uuid,
        fields: &LineFields,
    ) -> Result<LineRecord, LedgerError> {
        Self::require_account(unit, fields.master_account_id).await?;
        let existing = transaction_lines::Entity::find_by_id(id)
            .one(&*unit)
            .await
            .map_err(storage)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::TransactionLine, id))?;

        let mut active: transaction_lines::ActiveModel = existing.into();
        active.master_account_id = Set(fields.master_account_id);
        active.debited_amount = Set(fields.debited_amount);
        active.credited_amount = Set(fields.credited_amount);
        active.comment = Set(fields.comment.clone());

        let updated = active.update(&*unit).await.map_err(storage)?;
        Ok(updated.into())
    }

    async fn delete_line(&self, unit: &mut DatabaseTransaction, id: Uuid) -> Result<(), LedgerError> {
        let result = transaction_lines::Entity::delete_by_id(id)
            .exec(&*unit)
            .await
            .map_err(storage)?;
        if result.rows_affected == 0 {
            return Err(LedgerError::not_found(EntityKind::TransactionLine, id));
        }
        Ok(())
    }

    async fn list_lines(
        &self,
        unit: &mut DatabaseTransaction,
        transaction_id: Uuid,
    ) -> Result<Vec<LineRecord>, LedgerError> {
        let lines = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::TransactionId.eq(transaction_id))
            .order_by_asc(transaction_lines::Column::Id)
            .all(&*unit)
            .await
            .map_err(storage)?;
        Ok(lines.into_iter().map(Into::into).collect())
    }

    async fn get_account(
        &self,
        unit: &mut DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<AccountRecord>, LedgerError> {
        let model = master_accounts::Entity::find_by_id(id)
            .one(&*unit)
            .await
            .map_err(storage)?;
        Ok(model.map(Into::into))
    }

    async fn adjust_account_balance(
        &self,
        unit: &mut DatabaseTransaction,
        id: Uuid,
        delta: Decimal,
    ) -> Result<AccountRecord, LedgerError> {
        // Single UPDATE so concurrent units never lose an adjustment. The
        // range filter keeps the result inside the closing_amount column.
        let adjusted = || Expr::col(master_accounts::Column::ClosingAmount).add(delta);
        let result = master_accounts::Entity::update_many()
            .col_expr(master_accounts::Column::ClosingAmount, adjusted())
            .col_expr(master_accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(master_accounts::Column::Id.eq(id))
            .filter(Expr::expr(adjusted()).lt(AMOUNT_LIMIT))
            .filter(Expr::expr(adjusted()).gt(-AMOUNT_LIMIT))
            .exec(&*unit)
            .await
            .map_err(storage)?;
        if result.rows_affected == 0 {
            // Either the account is gone or the new balance is out of range.
            Self::require_account(unit, id).await?;
            return Err(LedgerError::closing_out_of_range(id));
        }

        let account = Self::require_account(unit, id).await?;
        debug!(
            account_id = %id,
            delta = %delta,
            closing_amount = %account.closing_amount,
            "Adjusted closing amount"
        );
        Ok(account.into())
    }

    async fn load_transaction(&self, id: Uuid) -> Result<Option<TransactionWithLines>, LedgerError> {
        let Some(header) = transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(storage)?
        else {
            return Ok(None);
        };
        Ok(self.attach_lines(vec![header]).await?.pop())
    }

    async fn list_transactions(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<TransactionWithLines>, LedgerError> {
        let headers = transactions::Entity::find()
            .filter(transactions::Column::OwnerId.eq(owner_id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(storage)?;
        self.attach_lines(headers).await
    }
}

impl OwnershipGuard for SeaOrmLedgerStore {
    async fn owner_of(&self, kind: EntityKind, id: Uuid) -> Result<Option<Uuid>, LedgerError> {
        let owner = match kind {
            EntityKind::Group => groups::Entity::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(storage)?
                .map(|g| g.owner_id),
            EntityKind::MasterAccount => master_accounts::Entity::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(storage)?
                .map(|a| a.owner_id),
            EntityKind::Transaction => transactions::Entity::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(storage)?
                .map(|t| t.owner_id),
            EntityKind::TransactionLine => {
                let Some(line) = transaction_lines::Entity::find_by_id(id)
                    .one(&self.db)
                    .await
                    .map_err(storage)?
                else {
                    return Ok(None);
                };
                transactions::Entity::find_by_id(line.transaction_id)
                    .one(&self.db)
                    .await
                    .map_err(storage)?
                    .map(|t| t.owner_id)
            }
        };
        Ok(owner)
    }
}
