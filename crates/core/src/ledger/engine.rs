//! Transaction engine.
//!
//! The only entry point for mutating transactions. Each operation validates
//! the request and checks ownership before a unit of work is opened, then
//! performs every header, line and balance write inside that one unit. The
//! unit is committed only if every step succeeded; any failure rolls it back
//! before the error is returned.

use std::collections::BTreeSet;

use tracing::{info, warn};
use uuid::Uuid;

use super::balance::BalanceProjector;
use super::error::LedgerError;
use super::reconcile::plan_line_changes;
use super::store::{LedgerStore, OwnershipGuard};
use super::types::{EntityKind, LineInput, Principal, TransactionInput, TransactionWithLines};
use super::validation::validate_transaction;

/// Orchestrates transaction create/update/delete over a [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct TransactionEngine<S> {
    store: S,
}

impl<S> TransactionEngine<S>
where
    S: LedgerStore + OwnershipGuard,
{
    /// Creates an engine over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Records a new transaction with its lines and posts every line to its account.
    ///
    /// Line IDs in the request are ignored; every line is created.
    pub async fn create(
        &self,
        principal: &Principal,
        input: &TransactionInput,
    ) -> Result<TransactionWithLines, LedgerError> {
        validate_transaction(input)?;
        self.authorize_accounts(principal, &input.lines).await?;

        let mut unit = self.store.begin_unit().await?;
        let outcome = self.create_in_unit(&mut unit, principal.id, input).await;
        let created = self.finish(unit, outcome).await?;

        info!(
            owner_id = %principal.id,
            transaction_id = %created.transaction.id,
            lines = created.lines.len(),
            "Transaction created"
        );
        Ok(created)
    }

    /// Replaces a transaction's header and reconciles its lines with the request.
    ///
    /// Stored lines missing from the request are deleted, lines carrying an
    /// ID are rewritten in place, and lines without an ID are created. Every
    /// rewritten line has its old delta reversed and its new delta applied.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: &TransactionInput,
    ) -> Result<TransactionWithLines, LedgerError> {
        validate_transaction(input)?;
        self.authorize_transaction(principal, id).await?;
        self.authorize_accounts(principal, &input.lines).await?;

        let mut unit = self.store.begin_unit().await?;
        let outcome = self.update_in_unit(&mut unit, id, input).await;
        let updated = self.finish(unit, outcome).await?;

        info!(
            owner_id = %principal.id,
            transaction_id = %id,
            lines = updated.lines.len(),
            "Transaction updated"
        );
        Ok(updated)
    }

    /// Deletes a transaction, reversing every line's balance contribution.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), LedgerError> {
        self.authorize_transaction(principal, id).await?;

        let mut unit = self.store.begin_unit().await?;
        let outcome = self.delete_in_unit(&mut unit, id).await;
        let removed = self.finish(unit, outcome).await?;

        info!(
            owner_id = %principal.id,
            transaction_id = %id,
            lines = removed,
            "Transaction deleted"
        );
        Ok(())
    }

    /// Returns a committed transaction with its lines.
    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<TransactionWithLines, LedgerError> {
        self.authorize_transaction(principal, id).await?;
        self.store
            .load_transaction(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Transaction, id))
    }

    /// Lists the principal's committed transactions, newest date first.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<TransactionWithLines>, LedgerError> {
        self.store.list_transactions(principal.id).await
    }

    async fn create_in_unit(
        &self,
        unit: &mut S::Unit,
        owner_id: Uuid,
        input: &TransactionInput,
    ) -> Result<TransactionWithLines, LedgerError> {
        let projector = BalanceProjector::new(&self.store);
        let transaction = self
            .store
            .create_transaction(unit, owner_id, &input.header())
            .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let fields = line.fields();
            let record = self.store.create_line(unit, transaction.id, &fields).await?;
            projector.apply(unit, &fields).await?;
            lines.push(record);
        }

        Ok(TransactionWithLines { transaction, lines })
    }

    async fn update_in_unit(
        &self,
        unit: &mut S::Unit,
        id: Uuid,
        input: &TransactionInput,
    ) -> Result<TransactionWithLines, LedgerError> {
        let projector = BalanceProjector::new(&self.store);
        let transaction = self
            .store
            .update_transaction_header(unit, id, &input.header())
            .await?;

        let existing = self.store.list_lines(unit, id).await?;
        let plan = plan_line_changes(existing, &input.lines)?;

        for line in &plan.removed {
            projector.reverse(unit, line).await?;
            self.store.delete_line(unit, line.id).await?;
        }

        for (current, requested) in &plan.updated {
            let fields = requested.fields();
            projector.reverse(unit, current).await?;
            self.store.update_line(unit, current.id, &fields).await?;
            projector.apply(unit, &fields).await?;
        }

        for requested in &plan.created {
            let fields = requested.fields();
            self.store.create_line(unit, id, &fields).await?;
            projector.apply(unit, &fields).await?;
        }

        let lines = self.store.list_lines(unit, id).await?;
        Ok(TransactionWithLines { transaction, lines })
    }

    async fn delete_in_unit(&self, unit: &mut S::Unit, id: Uuid) -> Result<usize, LedgerError> {
        if self.store.get_transaction(unit, id).await?.is_none() {
            return Err(LedgerError::not_found(EntityKind::Transaction, id));
        }

        let projector = BalanceProjector::new(&self.store);
        let lines = self.store.list_lines(unit, id).await?;
        for line in &lines {
            projector.reverse(unit, line).await?;
        }
        for line in &lines {
            self.store.delete_line(unit, line.id).await?;
        }
        self.store.delete_transaction(unit, id).await?;

        Ok(lines.len())
    }

    /// Commits on success, rolls back on failure.
    async fn finish<T>(
        &self,
        unit: S::Unit,
        outcome: Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        match outcome {
            Ok(value) => {
                self.store.commit(unit).await?;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "Rolling back ledger unit");
                if let Err(rollback_err) = self.store.rollback(unit).await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Missing transactions are `NotFound`; foreign ones are `Unauthorized`.
    async fn authorize_transaction(&self, principal: &Principal, id: Uuid) -> Result<(), LedgerError> {
        match self.store.owner_of(EntityKind::Transaction, id).await? {
            None => Err(LedgerError::not_found(EntityKind::Transaction, id)),
            Some(owner) if owner == principal.id => Ok(()),
            Some(_) => Err(LedgerError::unauthorized(EntityKind::Transaction, id)),
        }
    }

    async fn authorize_accounts(
        &self,
        principal: &Principal,
        lines: &[LineInput],
    ) -> Result<(), LedgerError> {
        let accounts: BTreeSet<Uuid> = lines.iter().map(|l| l.master_account_id).collect();
        for account_id in accounts {
            self.store
                .assert_owned(EntityKind::MasterAccount, account_id, principal.id)
                .await?;
        }
        Ok(())
    }
}
