//! Master account repository.
//!
//! Balances change here only through opening amount edits; line postings go
//! through the ledger store.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use ifinance_core::chart::{ChartError, check_opening, normalize_name, rebase_closing};

use crate::entities::{groups, master_accounts, transaction_lines};

/// Error types for master account operations.
#[derive(Debug, thiserror::Error)]
pub enum MasterAccountError {
    /// Account not found for this owner.
    #[error("Master account not found: {0}")]
    NotFound(Uuid),

    /// Group is missing or belongs to someone else.
    #[error("Group {0} is not accessible to this user")]
    GroupNotOwned(Uuid),

    /// Lines still post to the account.
    #[error("Cannot delete master account: {0} transaction lines reference it")]
    HasLines(u64),

    /// Chart rule violated.
    #[error(transparent)]
    Invalid(#[from] ChartError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a master account.
#[derive(Debug, Clone)]
pub struct CreateMasterAccountInput {
    /// Owning group.
    pub group_id: Uuid,
    /// Account name.
    pub name: String,
    /// Opening amount; the closing amount starts equal to it.
    pub opening_amount: Decimal,
}

/// Input for updating a master account.
#[derive(Debug, Clone, Default)]
pub struct UpdateMasterAccountInput {
    /// Owning group.
    pub group_id: Option<Uuid>,
    /// Account name.
    pub name: Option<String>,
    /// Opening amount.
    pub opening_amount: Option<Decimal>,
}

/// Master account repository, scoped by owner on every call.
#[derive(Debug, Clone)]
pub struct MasterAccountRepository {
    db: DatabaseConnection,
}

impl MasterAccountRepository {
    /// Creates a new master account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists an owner's accounts ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<master_accounts::Model>, DbErr> {
        master_accounts::Entity::find()
            .filter(master_accounts::Column::OwnerId.eq(owner_id))
            .order_by_asc(master_accounts::Column::Name)
            .all(&self.db)
            .await
    }

    /// Finds an owner's account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<master_accounts::Model>, DbErr> {
        master_accounts::Entity::find_by_id(id)
            .filter(master_accounts::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await
    }

    /// Creates an account with `closing_amount = opening_amount`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the opening amount cannot be
    /// stored, or the group is not the owner's.
    pub async fn create(
        &self,
        owner_id: Uuid,
        input: CreateMasterAccountInput,
    ) -> Result<master_accounts::Model, MasterAccountError> {
        let name = normalize_name(&input.name)?;
        let opening_amount = check_opening(input.opening_amount)?;
        Self::ensure_group(&self.db, owner_id, input.group_id).await?;

        let now = chrono::Utc::now();
        let account = master_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner_id),
            group_id: Set(input.group_id),
            name: Set(name),
            opening_amount: Set(opening_amount),
            closing_amount: Set(opening_amount),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(account.insert(&self.db).await?)
    }

    /// Updates name, group or opening amount.
    ///
    /// An opening amount edit shifts the closing amount by the same
    /// difference.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist for this owner, the
    /// name is blank, the new group is not the owner's, or the opening or
    /// rebased closing amount cannot be stored.
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        input: UpdateMasterAccountInput,
    ) -> Result<master_accounts::Model, MasterAccountError> {
        let txn = self.db.begin().await?;

        // Row lock keeps concurrent ledger units from posting between the
        // read and the rebased write.
        let account = master_accounts::Entity::find_by_id(id)
            .filter(master_accounts::Column::OwnerId.eq(owner_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(MasterAccountError::NotFound(id))?;

        let old_opening = account.opening_amount;
        let old_closing = account.closing_amount;
        let mut active: master_accounts::ActiveModel = account.into();

        if let Some(name) = input.name {
            active.name = Set(normalize_name(&name)?);
        }
        if let Some(group_id) = input.group_id {
            Self::ensure_group(&txn, owner_id, group_id).await?;
            active.group_id = Set(group_id);
        }
        if let Some(opening) = input.opening_amount {
            let closing = rebase_closing(old_opening, opening, old_closing)?;
            debug!(
                account_id = %id,
                old_opening = %old_opening,
                new_opening = %opening,
                closing_amount = %closing,
                "Rebased closing amount"
            );
            active.opening_amount = Set(opening);
            active.closing_amount = Set(closing);
        }
        active.updated_at = Set(chrono::Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Deletes an account no line posts to.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist for this owner or
    /// still has lines.
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), MasterAccountError> {
        let txn = self.db.begin().await?;

        // Posting a line locks the account row too, so no line can appear
        // between the count and the delete.
        master_accounts::Entity::find_by_id(id)
            .filter(master_accounts::Column::OwnerId.eq(owner_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(MasterAccountError::NotFound(id))?;

        let lines = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::MasterAccountId.eq(id))
            .count(&txn)
            .await?;
        if lines > 0 {
            return Err(MasterAccountError::HasLines(lines));
        }

        master_accounts::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn ensure_group<C: ConnectionTrait>(
        db: &C,
        owner_id: Uuid,
        group_id: Uuid,
    ) -> Result<(), MasterAccountError> {
        groups::Entity::find_by_id(group_id)
            .filter(groups::Column::OwnerId.eq(owner_id))
            .one(db)
            .await?
            .map(|_| ())
            .ok_or(MasterAccountError::GroupNotOwned(group_id))
    }
}
