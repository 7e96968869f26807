//! Property-based tests for the transaction engine.
//!
//! - Balance invariant: closing == opening + Σ(debit − credit) of attached lines
//! - Double-entry invariant: every committed transaction balances exactly
//! - Deletion reversal: deleting everything restores the opening amounts

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::balance::projected_closing;
use super::engine::TransactionEngine;
use super::memory::MemoryLedgerStore;
use super::types::{AccountRecord, LineInput, Principal, TransactionInput};
use crate::auth::UserRole;

const ACCOUNTS: usize = 4;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Debit legs as (account index, amount); one credit leg balances them.
fn balanced_legs() -> impl Strategy<Value = (Vec<(usize, Decimal)>, usize)> {
    (
        prop::collection::vec((0..ACCOUNTS, positive_amount()), 1..4),
        0..ACCOUNTS,
    )
}

#[derive(Debug, Clone)]
enum Op {
    Create(Vec<(usize, Decimal)>, usize),
    /// Rewrite the last listed transaction, keeping its first line.
    UpdateLast(Vec<(usize, Decimal)>, usize),
    /// Delete the first listed transaction.
    DeleteFirst,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => balanced_legs().prop_map(|(d, c)| Op::Create(d, c)),
        2 => balanced_legs().prop_map(|(d, c)| Op::UpdateLast(d, c)),
        1 => Just(Op::DeleteFirst),
    ]
}

fn to_lines(accounts: &[AccountRecord], debits: &[(usize, Decimal)], credit: usize) -> Vec<LineInput> {
    let total: Decimal = debits.iter().map(|(_, amount)| *amount).sum();
    let mut lines: Vec<LineInput> = debits
        .iter()
        .map(|(idx, amount)| LineInput {
            id: None,
            master_account_id: accounts[*idx].id,
            debited_amount: *amount,
            credited_amount: Decimal::ZERO,
            comment: None,
        })
        .collect();
    lines.push(LineInput {
        id: None,
        master_account_id: accounts[credit].id,
        debited_amount: Decimal::ZERO,
        credited_amount: total,
        comment: None,
    });
    lines
}

fn request(lines: Vec<LineInput>) -> TransactionInput {
    TransactionInput {
        date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        description: "Generated".to_string(),
        lines,
    }
}

async fn run_ops(ops: Vec<Op>) -> (TransactionEngine<MemoryLedgerStore>, Principal, Vec<AccountRecord>) {
    let store = MemoryLedgerStore::new();
    let principal = Principal::new(Uuid::new_v4(), UserRole::User);
    let mut accounts = Vec::with_capacity(ACCOUNTS);
    for i in 0..ACCOUNTS {
        let opening = Decimal::new(i64::try_from(i).unwrap() * 12_345, 2);
        accounts.push(
            store
                .insert_account(principal.id, &format!("Account {i}"), opening)
                .await,
        );
    }
    let engine = TransactionEngine::new(store);

    for op in ops {
        match op {
            Op::Create(debits, credit) => {
                engine
                    .create(&principal, &request(to_lines(&accounts, &debits, credit)))
                    .await
                    .unwrap();
            }
            Op::UpdateLast(debits, credit) => {
                let Some(last) = engine.list(&principal).await.unwrap().into_iter().last() else {
                    continue;
                };
                let mut lines = to_lines(&accounts, &debits, credit);
                lines[0].id = Some(last.lines[0].id);
                engine
                    .update(&principal, last.transaction.id, &request(lines))
                    .await
                    .unwrap();
            }
            Op::DeleteFirst => {
                if let Some(first) = engine.list(&principal).await.unwrap().into_iter().next() {
                    engine
                        .delete(&principal, first.transaction.id)
                        .await
                        .unwrap();
                }
            }
        }
    }

    (engine, principal, accounts)
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* sequence of committed operations, every account's closing
    /// amount equals its opening amount plus its attached lines' deltas.
    #[test]
    fn prop_balance_invariant_holds(ops in prop::collection::vec(op_strategy(), 1..12)) {
        let (engine, _, accounts) = block_on(run_ops(ops));
        block_on(async {
            for account in &accounts {
                let stored = engine.store().account(account.id).await.unwrap();
                let lines = engine.store().lines_for_account(account.id).await;
                prop_assert_eq!(
                    stored.closing_amount,
                    projected_closing(stored.opening_amount, &lines)
                );
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// *For any* sequence of committed operations, every stored transaction
    /// has equal debit and credit totals.
    #[test]
    fn prop_committed_transactions_balance(ops in prop::collection::vec(op_strategy(), 1..12)) {
        let (engine, principal, _) = block_on(run_ops(ops));
        let transactions = block_on(engine.list(&principal)).unwrap();
        for tx in transactions {
            prop_assert_eq!(tx.total_debit(), tx.total_credit());
        }
    }

    /// *For any* sequence of operations, deleting every remaining transaction
    /// returns each account to its opening amount.
    #[test]
    fn prop_deleting_everything_restores_openings(ops in prop::collection::vec(op_strategy(), 1..12)) {
        let (engine, principal, accounts) = block_on(run_ops(ops));
        block_on(async {
            for tx in engine.list(&principal).await.unwrap() {
                engine.delete(&principal, tx.transaction.id).await.unwrap();
            }
            for account in &accounts {
                let stored = engine.store().account(account.id).await.unwrap();
                prop_assert_eq!(stored.closing_amount, stored.opening_amount);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
