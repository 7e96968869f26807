//! Storage seams of the ledger.
//!
//! [`LedgerStore`] is the durable record keeper driven by the transaction
//! engine; [`OwnershipGuard`] answers who owns what. Both are implemented by
//! the database layer, and by an in-memory store in this crate's tests.

use std::future::Future;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{
    AccountRecord, EntityKind, LineFields, LineRecord, TransactionHeader, TransactionRecord,
    TransactionWithLines,
};

/// Unit-of-work based storage for transactions, lines and account balances.
///
/// Every mutating call takes the unit returned by [`LedgerStore::begin_unit`].
/// Writes made through a unit become visible to other readers only when the
/// unit is committed, and vanish entirely when it is rolled back. Each unit
/// must be finished with exactly one `commit` or `rollback`.
pub trait LedgerStore: Send + Sync {
    /// Open unit of work.
    type Unit: Send;

    /// Opens a unit of work.
    fn begin_unit(&self) -> impl Future<Output = Result<Self::Unit, LedgerError>> + Send;

    /// Persists every write buffered in the unit.
    fn commit(&self, unit: Self::Unit) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Discards every write buffered in the unit.
    fn rollback(&self, unit: Self::Unit)
    -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Inserts a transaction header owned by `owner_id`.
    fn create_transaction(
        &self,
        unit: &mut Self::Unit,
        owner_id: Uuid,
        header: &TransactionHeader,
    ) -> impl Future<Output = Result<TransactionRecord, LedgerError>> + Send;

    /// Overwrites the header fields of a transaction.
    fn update_transaction_header(
        &self,
        unit: &mut Self::Unit,
        id: Uuid,
        header: &TransactionHeader,
    ) -> impl Future<Output = Result<TransactionRecord, LedgerError>> + Send;

    /// Deletes a transaction header. Its lines must already be gone.
    fn delete_transaction(
        &self,
        unit: &mut Self::Unit,
        id: Uuid,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Reads a transaction header inside the unit.
    fn get_transaction(
        &self,
        unit: &mut Self::Unit,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<TransactionRecord>, LedgerError>> + Send;

    /// Inserts a line bound to `transaction_id`.
    fn create_line(
        &self,
        unit: &mut Self::Unit,
        transaction_id: Uuid,
        fields: &LineFields,
    ) -> impl Future<Output = Result<LineRecord, LedgerError>> + Send;

    /// Overwrites the stored fields of a line.
    fn update_line(
        &self,
        unit: &mut Self::Unit,
        id: Uuid,
        fields: &LineFields,
    ) -> impl Future<Output = Result<LineRecord, LedgerError>> + Send;

    /// Deletes a line.
    fn delete_line(
        &self,
        unit: &mut Self::Unit,
        id: Uuid,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Lists the lines of a transaction inside the unit.
    fn list_lines(
        &self,
        unit: &mut Self::Unit,
        transaction_id: Uuid,
    ) -> impl Future<Output = Result<Vec<LineRecord>, LedgerError>> + Send;

    /// Reads an account inside the unit.
    fn get_account(
        &self,
        unit: &mut Self::Unit,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<AccountRecord>, LedgerError>> + Send;

    /// Adds `delta` to an account's closing amount.
    ///
    /// This is the only write path for `closing_amount`.
    fn adjust_account_balance(
        &self,
        unit: &mut Self::Unit,
        id: Uuid,
        delta: Decimal,
    ) -> impl Future<Output = Result<AccountRecord, LedgerError>> + Send;

    /// Reads a committed transaction with its lines.
    fn load_transaction(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<TransactionWithLines>, LedgerError>> + Send;

    /// Lists an owner's committed transactions, newest date first.
    fn list_transactions(
        &self,
        owner_id: Uuid,
    ) -> impl Future<Output = Result<Vec<TransactionWithLines>, LedgerError>> + Send;
}

/// Ownership lookups for owner-scoped entities.
pub trait OwnershipGuard: Send + Sync {
    /// Returns the owner of an entity, or `None` if it does not exist.
    fn owner_of(
        &self,
        kind: EntityKind,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Uuid>, LedgerError>> + Send;

    /// Fails with `Unauthorized` unless the entity exists and belongs to `owner_id`.
    fn assert_owned(
        &self,
        kind: EntityKind,
        id: Uuid,
        owner_id: Uuid,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send {
        async move {
            match self.owner_of(kind, id).await? {
                Some(owner) if owner == owner_id => Ok(()),
                _ => Err(LedgerError::unauthorized(kind, id)),
            }
        }
    }
}
