//! Scenario tests for the transaction engine over the in-memory store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::balance::projected_closing;
use super::engine::TransactionEngine;
use super::error::LedgerError;
use super::memory::MemoryLedgerStore;
use super::store::LedgerStore;
use super::types::{AccountRecord, EntityKind, LineInput, Principal, TransactionInput};
use crate::auth::UserRole;

struct Fixture {
    engine: TransactionEngine<MemoryLedgerStore>,
    principal: Principal,
    cash: AccountRecord,
    revenue: AccountRecord,
    expense: AccountRecord,
}

async fn fixture() -> Fixture {
    let store = MemoryLedgerStore::new();
    let principal = Principal::new(Uuid::new_v4(), UserRole::User);
    let cash = store.insert_account(principal.id, "Cash asset", dec!(1000)).await;
    let revenue = store.insert_account(principal.id, "Sales revenue", dec!(0)).await;
    let expense = store.insert_account(principal.id, "Rent expense", dec!(0)).await;
    Fixture {
        engine: TransactionEngine::new(store),
        principal,
        cash,
        revenue,
        expense,
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn debit(account: Uuid, amount: Decimal) -> LineInput {
    LineInput {
        id: None,
        master_account_id: account,
        debited_amount: amount,
        credited_amount: Decimal::ZERO,
        comment: None,
    }
}

fn credit(account: Uuid, amount: Decimal) -> LineInput {
    LineInput {
        id: None,
        master_account_id: account,
        debited_amount: Decimal::ZERO,
        credited_amount: amount,
        comment: None,
    }
}

fn request(lines: Vec<LineInput>) -> TransactionInput {
    TransactionInput {
        date: date(),
        description: "Test transaction".to_string(),
        lines,
    }
}

async fn closing(fx: &Fixture, account: &AccountRecord) -> Decimal {
    fx.engine
        .store()
        .account(account.id)
        .await
        .unwrap()
        .closing_amount
}

async fn assert_balance_invariant(fx: &Fixture, account: &AccountRecord) {
    let stored = fx.engine.store().account(account.id).await.unwrap();
    let lines = fx.engine.store().lines_for_account(account.id).await;
    assert_eq!(
        stored.closing_amount,
        projected_closing(stored.opening_amount, &lines),
        "closing amount drifted for {}",
        stored.name
    );
}

#[tokio::test]
async fn test_create_shifts_both_accounts() {
    let fx = fixture().await;

    let created = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(100)),
                credit(fx.revenue.id, dec!(100)),
            ]),
        )
        .await
        .unwrap();

    assert_eq!(created.lines.len(), 2);
    assert_eq!(created.transaction.owner_id, fx.principal.id);
    assert_eq!(created.transaction.date, date());
    assert_eq!(closing(&fx, &fx.cash).await, dec!(1100));
    assert_eq!(closing(&fx, &fx.revenue).await, dec!(-100));
}

#[tokio::test]
async fn test_unbalanced_create_has_no_side_effects() {
    let fx = fixture().await;

    let result = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(100)),
                credit(fx.revenue.id, dec!(90)),
            ]),
        )
        .await;

    assert!(matches!(result, Err(LedgerError::UnbalancedEntry { .. })));
    assert!(fx.engine.list(&fx.principal).await.unwrap().is_empty());
    assert_eq!(closing(&fx, &fx.cash).await, dec!(1000));
    assert_eq!(closing(&fx, &fx.revenue).await, dec!(0));
}

#[tokio::test]
async fn test_read_after_write_returns_submitted_lines() {
    let fx = fixture().await;
    let mut lines = vec![
        debit(fx.expense.id, dec!(250.75)),
        credit(fx.cash.id, dec!(250.75)),
    ];
    lines[0].comment = Some("January rent".to_string());

    let created = fx
        .engine
        .create(&fx.principal, &request(lines))
        .await
        .unwrap();
    let fetched = fx
        .engine
        .get(&fx.principal, created.transaction.id)
        .await
        .unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.transaction.description, "Test transaction");
    assert_eq!(fetched.total_debit(), dec!(250.75));
    assert_eq!(fetched.total_credit(), dec!(250.75));
    assert!(
        fetched
            .lines
            .iter()
            .any(|l| l.comment.as_deref() == Some("January rent"))
    );
}

#[tokio::test]
async fn test_update_removes_and_adds_lines() {
    let fx = fixture().await;
    let created = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(100)),
                credit(fx.revenue.id, dec!(100)),
            ]),
        )
        .await
        .unwrap();
    let cash_line = created
        .lines
        .iter()
        .find(|l| l.master_account_id == fx.cash.id)
        .unwrap();

    // Keep the cash line, drop the revenue line, add an expense credit.
    let mut kept = debit(fx.cash.id, dec!(100));
    kept.id = Some(cash_line.id);
    let updated = fx
        .engine
        .update(
            &fx.principal,
            created.transaction.id,
            &request(vec![kept, credit(fx.expense.id, dec!(100))]),
        )
        .await
        .unwrap();

    assert_eq!(updated.lines.len(), 2);
    assert_eq!(closing(&fx, &fx.cash).await, dec!(1100));
    assert_eq!(closing(&fx, &fx.revenue).await, dec!(0));
    assert_eq!(closing(&fx, &fx.expense).await, dec!(-100));
}

#[tokio::test]
async fn test_update_of_existing_line_reverses_old_delta() {
    let fx = fixture().await;
    let created = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(100)),
                credit(fx.revenue.id, dec!(100)),
            ]),
        )
        .await
        .unwrap();

    let mut lines: Vec<LineInput> = created
        .lines
        .iter()
        .map(|l| LineInput {
            id: Some(l.id),
            master_account_id: l.master_account_id,
            debited_amount: l.debited_amount * dec!(3),
            credited_amount: l.credited_amount * dec!(3),
            comment: l.comment.clone(),
        })
        .collect();
    // Move the debit side to another account as well.
    if let Some(line) = lines.iter_mut().find(|l| l.master_account_id == fx.cash.id) {
        line.master_account_id = fx.expense.id;
    }

    fx.engine
        .update(&fx.principal, created.transaction.id, &request(lines))
        .await
        .unwrap();

    assert_eq!(closing(&fx, &fx.cash).await, dec!(1000));
    assert_eq!(closing(&fx, &fx.expense).await, dec!(300));
    assert_eq!(closing(&fx, &fx.revenue).await, dec!(-300));
    for account in [&fx.cash, &fx.expense, &fx.revenue] {
        assert_balance_invariant(&fx, account).await;
    }
}

#[tokio::test]
async fn test_update_with_foreign_line_id_rolls_back() {
    let fx = fixture().await;
    let created = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(40)),
                credit(fx.revenue.id, dec!(40)),
            ]),
        )
        .await
        .unwrap();

    let mut stray = debit(fx.cash.id, dec!(10));
    stray.id = Some(Uuid::new_v4());
    let mut replacement = request(vec![stray, credit(fx.revenue.id, dec!(10))]);
    replacement.description = "Changed".to_string();

    let result = fx
        .engine
        .update(&fx.principal, created.transaction.id, &replacement)
        .await;

    assert!(matches!(
        result,
        Err(LedgerError::NotFound {
            kind: EntityKind::TransactionLine,
            ..
        })
    ));
    let unchanged = fx
        .engine
        .get(&fx.principal, created.transaction.id)
        .await
        .unwrap();
    assert_eq!(unchanged, created);
    assert_eq!(closing(&fx, &fx.cash).await, dec!(1040));
}

#[tokio::test]
async fn test_delete_restores_balances() {
    let fx = fixture().await;
    let created = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(60)),
                debit(fx.cash.id, dec!(40)),
                credit(fx.revenue.id, dec!(100)),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(closing(&fx, &fx.cash).await, dec!(1100));

    fx.engine
        .delete(&fx.principal, created.transaction.id)
        .await
        .unwrap();

    assert_eq!(closing(&fx, &fx.cash).await, dec!(1000));
    assert_eq!(closing(&fx, &fx.revenue).await, dec!(0));
    assert!(matches!(
        fx.engine.get(&fx.principal, created.transaction.id).await,
        Err(LedgerError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_missing_transaction_is_not_found() {
    let fx = fixture().await;
    let result = fx.engine.delete(&fx.principal, Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(LedgerError::NotFound {
            kind: EntityKind::Transaction,
            ..
        })
    ));
}

#[tokio::test]
async fn test_foreign_account_rejected_before_unit() {
    let fx = fixture().await;
    let stranger = fx
        .engine
        .store()
        .insert_account(Uuid::new_v4(), "Stranger cash asset", dec!(0))
        .await;

    let result = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(stranger.id, dec!(10)),
                credit(fx.revenue.id, dec!(10)),
            ]),
        )
        .await;

    assert!(matches!(
        result,
        Err(LedgerError::Unauthorized {
            kind: EntityKind::MasterAccount,
            id
        }) if id == stranger.id
    ));
    assert_eq!(closing(&fx, &fx.revenue).await, dec!(0));
}

#[tokio::test]
async fn test_other_owner_cannot_touch_transaction() {
    let fx = fixture().await;
    let created = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(5)),
                credit(fx.revenue.id, dec!(5)),
            ]),
        )
        .await
        .unwrap();
    let intruder = Principal::new(Uuid::new_v4(), UserRole::User);

    assert!(matches!(
        fx.engine.get(&intruder, created.transaction.id).await,
        Err(LedgerError::Unauthorized { .. })
    ));
    assert!(matches!(
        fx.engine.delete(&intruder, created.transaction.id).await,
        Err(LedgerError::Unauthorized { .. })
    ));
    assert!(fx.engine.list(&intruder).await.unwrap().is_empty());
    assert_eq!(closing(&fx, &fx.cash).await, dec!(1005));
}

#[tokio::test]
async fn test_storage_failure_mid_create_rolls_back() {
    let fx = fixture().await;
    fx.engine.store().fail_adjustments_for(fx.revenue.id).await;

    let result = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(100)),
                credit(fx.revenue.id, dec!(100)),
            ]),
        )
        .await;

    assert!(matches!(result, Err(LedgerError::StorageFailure(_))));
    assert!(fx.engine.list(&fx.principal).await.unwrap().is_empty());
    assert_eq!(closing(&fx, &fx.cash).await, dec!(1000));
    assert!(fx.engine.store().lines_for_account(fx.cash.id).await.is_empty());
}

#[tokio::test]
async fn test_closing_amount_past_storable_range_rolls_back() {
    let fx = fixture().await;

    // Each line fits, but cash would close at exactly 10^12.
    let result = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(999_999_999_000)),
                credit(fx.revenue.id, dec!(999_999_999_000)),
            ]),
        )
        .await;

    assert!(matches!(result, Err(LedgerError::ValidationError(_))));
    assert!(fx.engine.list(&fx.principal).await.unwrap().is_empty());
    assert_eq!(closing(&fx, &fx.cash).await, dec!(1000));
    assert_eq!(closing(&fx, &fx.revenue).await, dec!(0));
}

#[tokio::test]
async fn test_storage_failure_mid_delete_rolls_back() {
    let fx = fixture().await;
    let created = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(70)),
                credit(fx.expense.id, dec!(70)),
            ]),
        )
        .await
        .unwrap();
    fx.engine.store().fail_adjustments_for(fx.expense.id).await;

    let result = fx.engine.delete(&fx.principal, created.transaction.id).await;

    assert!(matches!(result, Err(LedgerError::StorageFailure(_))));
    assert_eq!(
        fx.engine
            .get(&fx.principal, created.transaction.id)
            .await
            .unwrap(),
        created
    );
    assert_eq!(closing(&fx, &fx.cash).await, dec!(1070));
    assert_eq!(closing(&fx, &fx.expense).await, dec!(-70));
}

#[tokio::test]
async fn test_engine_releases_unit_after_failure() {
    let fx = fixture().await;
    fx.engine.store().fail_adjustments_for(fx.revenue.id).await;

    let failed = fx
        .engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.cash.id, dec!(1)),
                credit(fx.revenue.id, dec!(1)),
            ]),
        )
        .await;
    assert!(failed.is_err());

    // A new unit can still be opened: the failed one was rolled back.
    let unit = fx.engine.store().begin_unit().await.unwrap();
    fx.engine.store().rollback(unit).await.unwrap();

    fx.engine
        .create(
            &fx.principal,
            &request(vec![
                debit(fx.expense.id, dec!(1)),
                credit(fx.cash.id, dec!(1)),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(closing(&fx, &fx.cash).await, dec!(999));
}

#[tokio::test]
async fn test_list_is_newest_date_first() {
    let fx = fixture().await;
    for (day, amount) in [(3, dec!(1)), (1, dec!(2)), (2, dec!(3))] {
        let mut req = request(vec![
            debit(fx.cash.id, amount),
            credit(fx.revenue.id, amount),
        ]);
        req.date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        fx.engine.create(&fx.principal, &req).await.unwrap();
    }

    let days: Vec<_> = fx
        .engine
        .list(&fx.principal)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.transaction.date)
        .collect();
    assert_eq!(
        days,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ]
    );
}
