//! Integration tests for the transaction engine over the database store.

mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use ifinance_core::auth::UserRole;
use ifinance_core::ledger::{
    EntityKind, LedgerError, LineInput, OwnershipGuard, Principal, TransactionEngine,
    TransactionInput,
};
use ifinance_db::SeaOrmLedgerStore;
use ifinance_db::entities::{master_accounts, transaction_lines, transactions};

use common::{Books, create_books, setup_db};

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

fn input(date: &str, lines: Vec<LineInput>) -> TransactionInput {
    TransactionInput {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date"),
        description: "Test entry".to_string(),
        lines,
    }
}

async fn closing(db: &DatabaseConnection, id: Uuid) -> Decimal {
    master_accounts::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("Failed to load account")
        .expect("Account should exist")
        .closing_amount
}

async fn fixture() -> (DatabaseConnection, TransactionEngine<SeaOrmLedgerStore>, Books, Principal) {
    let db = setup_db().await;
    let books = create_books(
        &db,
        "alice",
        &[("Cash", dec!(1000)), ("Revenue", dec!(0)), ("Rent", dec!(0))],
    )
    .await;
    let principal = Principal::new(books.owner.id, UserRole::User);
    let engine = TransactionEngine::new(SeaOrmLedgerStore::new(db.clone()));
    (db, engine, books, principal)
}

#[tokio::test]
async fn test_create_posts_both_accounts() {
    let (db, engine, books, principal) = fixture().await;
    let cash = books.accounts[0].id;
    let revenue = books.accounts[1].id;

    let created = engine
        .create(
            &principal,
            &input("2024-01-01", vec![debit(cash, dec!(100)), credit(revenue, dec!(100))]),
        )
        .await
        .expect("Failed to create transaction");

    assert_eq!(created.lines.len(), 2);
    assert_eq!(created.transaction.owner_id, books.owner.id);
    assert_eq!(closing(&db, cash).await, dec!(1100));
    assert_eq!(closing(&db, revenue).await, dec!(-100));

    let fetched = engine
        .get(&principal, created.transaction.id)
        .await
        .expect("Failed to fetch transaction");
    assert_eq!(fetched.transaction.description, "Test entry");
    assert_eq!(fetched.total_debit(), dec!(100));
    assert_eq!(fetched.total_credit(), dec!(100));
}

#[tokio::test]
async fn test_unbalanced_create_writes_nothing() {
    let (db, engine, books, principal) = fixture().await;
    let cash = books.accounts[0].id;
    let revenue = books.accounts[1].id;

    let err = engine
        .create(
            &principal,
            &input("2024-01-01", vec![debit(cash, dec!(100)), credit(revenue, dec!(90))]),
        )
        .await
        .expect_err("Unbalanced entry must fail");

    assert!(matches!(err, LedgerError::UnbalancedEntry { .. }));
    assert_eq!(closing(&db, cash).await, dec!(1000));
    let stored = transactions::Entity::find()
        .all(&db)
        .await
        .expect("Failed to list transactions");
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_closing_amount_past_storable_range_writes_nothing() {
    let (db, engine, books, principal) = fixture().await;
    let cash = books.accounts[0].id;
    let revenue = books.accounts[1].id;

    let err = engine
        .create(
            &principal,
            &input(
                "2024-01-01",
                vec![
                    debit(cash, dec!(999_999_999_000)),
                    credit(revenue, dec!(999_999_999_000)),
                ],
            ),
        )
        .await
        .expect_err("Closing amount of 10^12 must be rejected");

    assert!(matches!(err, LedgerError::ValidationError(_)));
    assert_eq!(closing(&db, cash).await, dec!(1000));
    assert_eq!(closing(&db, revenue).await, dec!(0));
    let lines = transaction_lines::Entity::find()
        .all(&db)
        .await
        .expect("Failed to list lines");
    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_update_reconciles_lines() {
    let (db, engine, books, principal) = fixture().await;
    let cash = books.accounts[0].id;
    let revenue = books.accounts[1].id;
    let rent = books.accounts[2].id;

    let created = engine
        .create(
            &principal,
            &input("2024-01-01", vec![debit(cash, dec!(100)), credit(revenue, dec!(100))]),
        )
        .await
        .expect("Failed to create transaction");

    // Keep the cash line at a new amount, drop the revenue line, add a rent line.
    let cash_line = created
        .lines
        .iter()
        .find(|l| l.master_account_id == cash)
        .expect("cash line");
    let mut kept = credit(cash, dec!(40));
    kept.id = Some(cash_line.id);

    let updated = engine
        .update(
            &principal,
            created.transaction.id,
            &input("2024-01-02", vec![kept, debit(rent, dec!(40))]),
        )
        .await
        .expect("Failed to update transaction");

    assert_eq!(updated.lines.len(), 2);
    assert_eq!(
        updated.transaction.date,
        NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date")
    );
    assert_eq!(closing(&db, cash).await, dec!(960));
    assert_eq!(closing(&db, revenue).await, dec!(0));
    assert_eq!(closing(&db, rent).await, dec!(40));
    assert!(updated.lines.iter().any(|l| l.id == cash_line.id));
}

#[tokio::test]
async fn test_update_with_foreign_line_id_rolls_back() {
    let (db, engine, books, principal) = fixture().await;
    let cash = books.accounts[0].id;
    let revenue = books.accounts[1].id;

    let created = engine
        .create(
            &principal,
            &input("2024-01-01", vec![debit(cash, dec!(100)), credit(revenue, dec!(100))]),
        )
        .await
        .expect("Failed to create transaction");

    let mut stray = debit(cash, dec!(50));
    stray.id = Some(Uuid::new_v4());
    let err = engine
        .update(
            &principal,
            created.transaction.id,
            &input("2024-03-01", vec![stray, credit(revenue, dec!(50))]),
        )
        .await
        .expect_err("Unknown line id must fail");

    assert!(matches!(
        err,
        LedgerError::NotFound {
            kind: EntityKind::TransactionLine,
            ..
        }
    ));
    assert_eq!(closing(&db, cash).await, dec!(1100));
    assert_eq!(closing(&db, revenue).await, dec!(-100));
    let reloaded = engine
        .get(&principal, created.transaction.id)
        .await
        .expect("Failed to fetch transaction");
    assert_eq!(reloaded.transaction.date, created.transaction.date);
}

#[tokio::test]
async fn test_delete_restores_balances() {
    let (db, engine, books, principal) = fixture().await;
    let cash = books.accounts[0].id;
    let revenue = books.accounts[1].id;

    let created = engine
        .create(
            &principal,
            &input(
                "2024-01-01",
                vec![
                    debit(cash, dec!(60)),
                    debit(cash, dec!(40)),
                    credit(revenue, dec!(100)),
                ],
            ),
        )
        .await
        .expect("Failed to create transaction");

    engine
        .delete(&principal, created.transaction.id)
        .await
        .expect("Failed to delete transaction");

    assert_eq!(closing(&db, cash).await, dec!(1000));
    assert_eq!(closing(&db, revenue).await, dec!(0));
    let lines = transaction_lines::Entity::find()
        .all(&db)
        .await
        .expect("Failed to list lines");
    assert!(lines.is_empty());
    let err = engine
        .get(&principal, created.transaction.id)
        .await
        .expect_err("Deleted transaction must be gone");
    assert!(matches!(err, LedgerError::NotFound { .. }));
}

#[tokio::test]
async fn test_other_owner_is_rejected() {
    let (db, engine, books, principal) = fixture().await;
    let cash = books.accounts[0].id;
    let revenue = books.accounts[1].id;
    let created = engine
        .create(
            &principal,
            &input("2024-01-01", vec![debit(cash, dec!(10)), credit(revenue, dec!(10))]),
        )
        .await
        .expect("Failed to create transaction");

    let intruder_books = create_books(&db, "mallory", &[("Mallory Cash", dec!(0))]).await;
    let intruder = Principal::new(intruder_books.owner.id, UserRole::User);

    let err = engine
        .get(&intruder, created.transaction.id)
        .await
        .expect_err("Foreign transaction must be rejected");
    assert!(matches!(err, LedgerError::Unauthorized { .. }));

    let err = engine
        .create(
            &intruder,
            &input(
                "2024-01-01",
                vec![
                    debit(intruder_books.accounts[0].id, dec!(10)),
                    credit(cash, dec!(10)),
                ],
            ),
        )
        .await
        .expect_err("Posting to a foreign account must be rejected");
    assert!(matches!(
        err,
        LedgerError::Unauthorized {
            kind: EntityKind::MasterAccount,
            ..
        }
    ));

    assert!(
        engine
            .list(&intruder)
            .await
            .expect("Failed to list")
            .is_empty()
    );
    assert_eq!(closing(&db, cash).await, dec!(1010));
}

#[tokio::test]
async fn test_list_newest_first() {
    let (_db, engine, books, principal) = fixture().await;
    let cash = books.accounts[0].id;
    let revenue = books.accounts[1].id;

    for date in ["2024-01-05", "2024-03-01", "2024-02-10"] {
        engine
            .create(
                &principal,
                &input(date, vec![debit(cash, dec!(1)), credit(revenue, dec!(1))]),
            )
            .await
            .expect("Failed to create transaction");
    }

    let listed = engine.list(&principal).await.expect("Failed to list");
    let dates: Vec<String> = listed
        .iter()
        .map(|t| t.transaction.date.to_string())
        .collect();
    assert_eq!(dates, vec!["2024-03-01", "2024-02-10", "2024-01-05"]);
    assert!(listed.iter().all(|t| t.lines.len() == 2));
}

#[tokio::test]
async fn test_owner_lookup() {
    let (_db, engine, books, principal) = fixture().await;
    let store = engine.store();

    assert_eq!(
        store
            .owner_of(EntityKind::Group, books.group.id)
            .await
            .expect("lookup"),
        Some(principal.id)
    );
    assert_eq!(
        store
            .owner_of(EntityKind::MasterAccount, Uuid::new_v4())
            .await
            .expect("lookup"),
        None
    );
    store
        .assert_owned(EntityKind::MasterAccount, books.accounts[0].id, principal.id)
        .await
        .expect("Account should be owned");
    assert!(
        store
            .assert_owned(EntityKind::Group, books.group.id, Uuid::new_v4())
            .await
            .is_err()
    );
}
