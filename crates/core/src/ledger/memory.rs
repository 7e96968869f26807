//! In-memory ledger store.
//!
//! Committed state is an immutable snapshot behind an `Arc`. A unit of work
//! clones the snapshot, mutates the clone, and on commit swaps it in as the
//! new snapshot; rollback simply drops the clone. Units are serialized by a
//! writer lock held for the unit's lifetime, so readers always see either
//! the state before a unit or the state after it, never a mix.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use super::error::LedgerError;
use crate::amount::checked_sum;
use super::store::{LedgerStore, OwnershipGuard};
use super::types::{
    AccountRecord, EntityKind, LineFields, LineRecord, TransactionHeader, TransactionRecord,
    TransactionWithLines,
};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    groups: HashMap<Uuid, Uuid>,
    accounts: HashMap<Uuid, AccountRecord>,
    transactions: HashMap<Uuid, TransactionRecord>,
    lines: HashMap<Uuid, LineRecord>,
}

impl LedgerState {
    fn lines_of(&self, transaction_id: Uuid) -> Vec<LineRecord> {
        let mut lines: Vec<LineRecord> = self
            .lines
            .values()
            .filter(|l| l.transaction_id == transaction_id)
            .cloned()
            .collect();
        lines.sort_by_key(|l| l.id);
        lines
    }

    fn with_lines(&self, transaction: &TransactionRecord) -> TransactionWithLines {
        TransactionWithLines {
            transaction: transaction.clone(),
            lines: self.lines_of(transaction.id),
        }
    }

    fn require_account(&self, id: Uuid) -> Result<(), LedgerError> {
        if self.accounts.contains_key(&id) {
            Ok(())
        } else {
            Err(LedgerError::not_found(EntityKind::MasterAccount, id))
        }
    }
}

/// Unit of work over a [`MemoryLedgerStore`].
#[derive(Debug)]
pub struct MemoryUnit {
    working: LedgerState,
    _writer: OwnedMutexGuard<()>,
}

/// Ledger store keeping everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    committed: Arc<RwLock<Arc<LedgerState>>>,
    writer: Arc<Mutex<()>>,
    failing_accounts: Arc<RwLock<HashSet<Uuid>>>,
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a group owned by `owner_id` and returns its ID.
    pub async fn insert_group(&self, owner_id: Uuid) -> Uuid {
        let id = Uuid::now_v7();
        self.write_committed(|state| {
            state.groups.insert(id, owner_id);
        })
        .await;
        id
    }

    /// Registers a master account whose closing amount starts at its opening amount.
    pub async fn insert_account(
        &self,
        owner_id: Uuid,
        name: &str,
        opening_amount: Decimal,
    ) -> AccountRecord {
        let account = AccountRecord {
            id: Uuid::now_v7(),
            owner_id,
            name: name.to_string(),
            opening_amount,
            closing_amount: opening_amount,
        };
        let stored = account.clone();
        self.write_committed(move |state| {
            state.accounts.insert(stored.id, stored);
        })
        .await;
        account
    }

    /// Returns the committed state of an account.
    pub async fn account(&self, id: Uuid) -> Option<AccountRecord> {
        self.snapshot().await.accounts.get(&id).cloned()
    }

    /// Returns every committed line posted to an account.
    pub async fn lines_for_account(&self, account_id: Uuid) -> Vec<LineRecord> {
        let snapshot = self.snapshot().await;
        let mut lines: Vec<LineRecord> = snapshot
            .lines
            .values()
            .filter(|l| l.master_account_id == account_id)
            .cloned()
            .collect();
        lines.sort_by_key(|l| l.id);
        lines
    }

    /// Makes every later balance adjustment of `account_id` fail with `StorageFailure`.
    pub async fn fail_adjustments_for(&self, account_id: Uuid) {
        self.failing_accounts.write().await.insert(account_id);
    }

    async fn snapshot(&self) -> Arc<LedgerState> {
        Arc::clone(&*self.committed.read().await)
    }

    async fn write_committed<F>(&self, mutate: F)
    where
        F: FnOnce(&mut LedgerState),
    {
        let _writer = self.writer.lock().await;
        let mut committed = self.committed.write().await;
        let mut next = LedgerState::clone(&committed);
        mutate(&mut next);
        *committed = Arc::new(next);
    }
}

impl LedgerStore for MemoryLedgerStore {
    type Unit = MemoryUnit;

    async fn begin_unit(&self) -> Result<MemoryUnit, LedgerError> {
        let writer = Arc::clone(&self.writer).lock_owned().await;
        let working = LedgerState::clone(&*self.snapshot().await);
        Ok(MemoryUnit {
            working,
            _writer: writer,
        })
    }

    async fn commit(&self, unit: MemoryUnit) -> Result<(), LedgerError> {
        let MemoryUnit { working, _writer } = unit;
        *self.committed.write().await = Arc::new(working);
        Ok(())
    }

    async fn rollback(&self, unit: MemoryUnit) -> Result<(), LedgerError> {
        drop(unit);
        Ok(())
    }

    async fn create_transaction(
        &self,
        unit: &mut MemoryUnit,
        owner_id: Uuid,
        header: &TransactionHeader,
    ) -> Result<TransactionRecord, LedgerError> {
        let now = Utc::now();
        let record = TransactionRecord {
            id: Uuid::now_v7(),
            owner_id,
            date: header.date,
            description: header.description.clone(),
            created_at: now,
            updated_at: now,
        };
        unit.working.transactions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_transaction_header(
        &self,
        unit: &mut MemoryUnit,
        id: Uuid,
        header: &TransactionHeader,
    ) -> Result<TransactionRecord, LedgerError> {
        let record = unit
            .working
            .transactions
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Transaction, id))?;
        record.date = header.date;
        record.description.clone_from(&header.description);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_transaction(&self, unit: &mut MemoryUnit, id: Uuid) -> Result<(), LedgerError> {
        if unit.working.lines.values().any(|l| l.transaction_id == id) {
            return Err(LedgerError::StorageFailure(format!(
                "transaction {id} still has lines"
            )));
        }
        unit.working
            .transactions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::not_found(EntityKind::Transaction, id))
    }

    async fn get_transaction(
        &self,
        unit: &mut MemoryUnit,
        id: Uuid,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(unit.working.transactions.get(&id).cloned())
    }

    async fn create_line(
        &self,
        unit: &mut MemoryUnit,
        transaction_id: Uuid,
        fields: &LineFields,
    ) -> Result<LineRecord, LedgerError> {
        if !unit.working.transactions.contains_key(&transaction_id) {
            return Err(LedgerError::not_found(EntityKind::Transaction, transaction_id));
        }
        unit.working.require_account(fields.master_account_id)?;

        let record = LineRecord {
            id: Uuid::now_v7(),
            transaction_id,
            master_account_id: fields.master_account_id,
            debited_amount: fields.debited_amount,
            credited_amount: fields.credited_amount,
            comment: fields.comment.clone(),
        };
        unit.working.lines.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_line(
        &self,
        unit: &mut MemoryUnit,
        id: Uuid,
        fields: &LineFields,
    ) -> Result<LineRecord, LedgerError> {
        unit.working.require_account(fields.master_account_id)?;
        let record = unit
            .working
            .lines
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::TransactionLine, id))?;
        record.master_account_id = fields.master_account_id;
        record.debited_amount = fields.debited_amount;
        record.credited_amount = fields.credited_amount;
        record.comment.clone_from(&fields.comment);
        Ok(record.clone())
    }

    async fn delete_line(&self, unit: &mut MemoryUnit, id: Uuid) -> Result<(), LedgerError> {
        unit.working
            .lines
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::not_found(EntityKind::TransactionLine, id))
    }

    async fn list_lines(
        &self,
        unit: &mut MemoryUnit,
        transaction_id: Uuid,
    ) -> Result<Vec<LineRecord>, LedgerError> {
        Ok(unit.working.lines_of(transaction_id))
    }

    async fn get_account(
        &self,
        unit: &mut MemoryUnit,
        id: Uuid,
    ) -> Result<Option<AccountRecord>, LedgerError> {
        Ok(unit.working.accounts.get(&id).cloned())
    }

    async fn adjust_account_balance(
        &self,
        unit: &mut MemoryUnit,
        id: Uuid,
        delta: Decimal,
    ) -> Result<AccountRecord, LedgerError> {
        if self.failing_accounts.read().await.contains(&id) {
            return Err(LedgerError::StorageFailure(format!(
                "balance write for account {id} failed"
            )));
        }
        let account = unit
            .working
            .accounts
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::MasterAccount, id))?;
        account.closing_amount = checked_sum(account.closing_amount, delta)
            .map_err(|_| LedgerError::closing_out_of_range(id))?;
        Ok(account.clone())
    }

    async fn load_transaction(&self, id: Uuid) -> Result<Option<TransactionWithLines>, LedgerError> {
        let snapshot = self.snapshot().await;
        Ok(snapshot.transactions.get(&id).map(|t| snapshot.with_lines(t)))
    }

    async fn list_transactions(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<TransactionWithLines>, LedgerError> {
        let snapshot = self.snapshot().await;
        let mut headers: Vec<&TransactionRecord> = snapshot
            .transactions
            .values()
            .filter(|t| t.owner_id == owner_id)
            .collect();
        headers.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(headers.into_iter().map(|t| snapshot.with_lines(t)).collect())
    }
}

impl OwnershipGuard for MemoryLedgerStore {
    async fn owner_of(&self, kind: EntityKind, id: Uuid) -> Result<Option<Uuid>, LedgerError> {
        let snapshot = self.snapshot().await;
        let owner = match kind {
            EntityKind::Group => snapshot.groups.get(&id).copied(),
            EntityKind::MasterAccount => snapshot.accounts.get(&id).map(|a| a.owner_id),
            EntityKind::Transaction => snapshot.transactions.get(&id).map(|t| t.owner_id),
            EntityKind::TransactionLine => snapshot
                .lines
                .get(&id)
                .and_then(|l| snapshot.transactions.get(&l.transaction_id))
                .map(|t| t.owner_id),
        };
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn header() -> TransactionHeader {
        TransactionHeader {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            description: "Opening".to_string(),
        }
    }

    #[tokio::test]
    async fn test_rollback_discards_unit_writes() {
        let store = MemoryLedgerStore::new();
        let owner = Uuid::new_v4();
        let account = store.insert_account(owner, "Cash", dec!(0)).await;

        let mut unit = store.begin_unit().await.unwrap();
        let tx = store.create_transaction(&mut unit, owner, &header()).await.unwrap();
        store
            .adjust_account_balance(&mut unit, account.id, dec!(50))
            .await
            .unwrap();
        store.rollback(unit).await.unwrap();

        assert!(store.load_transaction(tx.id).await.unwrap().is_none());
        assert_eq!(store.account(account.id).await.unwrap().closing_amount, dec!(0));
    }

    #[tokio::test]
    async fn test_unit_writes_invisible_until_commit() {
        let store = MemoryLedgerStore::new();
        let owner = Uuid::new_v4();
        let account = store.insert_account(owner, "Cash", dec!(10)).await;

        let mut unit = store.begin_unit().await.unwrap();
        store
            .adjust_account_balance(&mut unit, account.id, dec!(5))
            .await
            .unwrap();
        assert_eq!(store.account(account.id).await.unwrap().closing_amount, dec!(10));

        store.commit(unit).await.unwrap();
        assert_eq!(store.account(account.id).await.unwrap().closing_amount, dec!(15));
    }

    #[tokio::test]
    async fn test_line_requires_existing_account() {
        let store = MemoryLedgerStore::new();
        let owner = Uuid::new_v4();

        let mut unit = store.begin_unit().await.unwrap();
        let tx = store.create_transaction(&mut unit, owner, &header()).await.unwrap();
        let missing = Uuid::new_v4();
        let result = store
            .create_line(
                &mut unit,
                tx.id,
                &LineFields {
                    master_account_id: missing,
                    debited_amount: dec!(1),
                    credited_amount: dec!(0),
                    comment: None,
                },
            )
            .await;
        store.rollback(unit).await.unwrap();

        assert!(matches!(
            result,
            Err(LedgerError::NotFound { kind: EntityKind::MasterAccount, id }) if id == missing
        ));
    }

    #[tokio::test]
    async fn test_owner_lookup() {
        let store = MemoryLedgerStore::new();
        let owner = Uuid::new_v4();
        let group = store.insert_group(owner).await;
        let account = store.insert_account(owner, "Cash", dec!(0)).await;

        assert_eq!(
            store.owner_of(EntityKind::Group, group).await.unwrap(),
            Some(owner)
        );
        assert!(
            store
                .assert_owned(EntityKind::MasterAccount, account.id, owner)
                .await
                .is_ok()
        );
        assert!(matches!(
            store
                .assert_owned(EntityKind::MasterAccount, account.id, Uuid::new_v4())
                .await,
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(matches!(
            store
                .assert_owned(EntityKind::MasterAccount, Uuid::new_v4(), owner)
                .await,
            Err(LedgerError::Unauthorized { .. })
        ));
    }
}
