//! Shared fixtures for database integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use ifinance_db::entities::sea_orm_active_enums::{NormalBalance, UserRole};
use ifinance_db::entities::{account_categories, groups, master_accounts, users};
use ifinance_db::migration::{Migrator, MigratorTrait};
use ifinance_db::repositories::{
    CategoryRepository, CreateGroupInput, CreateMasterAccountInput, CreateUserInput,
    GroupRepository, MasterAccountRepository, UserRepository,
};

/// Fresh in-memory database with the schema applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = ifinance_db::connect("sqlite::memory:")
        .await
        .expect("Failed to open sqlite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> users::Model {
    UserRepository::new(db.clone())
        .create(CreateUserInput {
            name: format!("{username} name"),
            username: username.to_string(),
            password_hash: "$argon2id$test_hash".to_string(),
            role: UserRole::User,
            email: Some(format!("{username}@example.com")),
            address: None,
            date_hired: None,
        })
        .await
        .expect("Failed to create user")
}

pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    side: NormalBalance,
) -> account_categories::Model {
    CategoryRepository::new(db.clone())
        .create(name, side)
        .await
        .expect("Failed to create category")
}

pub async fn create_group(
    db: &DatabaseConnection,
    owner_id: Uuid,
    category_id: Uuid,
    name: &str,
) -> groups::Model {
    GroupRepository::new(db.clone())
        .create(
            owner_id,
            CreateGroupInput {
                name: name.to_string(),
                account_category_id: category_id,
                parent_id: None,
            },
        )
        .await
        .expect("Failed to create group")
}

pub async fn create_account(
    db: &DatabaseConnection,
    owner_id: Uuid,
    group_id: Uuid,
    name: &str,
    opening: Decimal,
) -> master_accounts::Model {
    MasterAccountRepository::new(db.clone())
        .create(
            owner_id,
            CreateMasterAccountInput {
                group_id,
                name: name.to_string(),
                opening_amount: opening,
            },
        )
        .await
        .expect("Failed to create account")
}

/// One user with a group and the named accounts under it.
pub struct Books {
    pub owner: users::Model,
    pub group: groups::Model,
    pub accounts: Vec<master_accounts::Model>,
}

pub async fn create_books(
    db: &DatabaseConnection,
    username: &str,
    accounts: &[(&str, Decimal)],
) -> Books {
    let owner = create_user(db, username).await;
    let category = match CategoryRepository::new(db.clone())
        .find_by_name("Assets")
        .await
        .expect("Failed to query categories")
    {
        Some(existing) => existing,
        None => create_category(db, "Assets", NormalBalance::Debit).await,
    };
    let group = create_group(db, owner.id, category.id, "General").await;

    let mut created = Vec::with_capacity(accounts.len());
    for (name, opening) in accounts {
        created.push(create_account(db, owner.id, group.id, name, *opening).await);
    }

    Books {
        owner,
        group,
        accounts: created,
    }
}
