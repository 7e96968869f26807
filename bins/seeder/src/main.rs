//! Database seeder for iFinance.
//!
//! Creates the default account categories and the bootstrap administrator
//! from the `seed` config section. Safe to run repeatedly; existing rows are
//! left untouched.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ifinance_core::auth::hash_password;
use ifinance_db::{
    CategoryRepository, UserRepository,
    entities::sea_orm_active_enums::{NormalBalance, UserRole},
    repositories::CreateUserInput,
};
use ifinance_shared::{AppConfig, config::SeedConfig};
use sea_orm::DatabaseConnection;

const DEFAULT_CATEGORIES: [(&str, NormalBalance); 4] = [
    ("Assets", NormalBalance::Debit),
    ("Liabilities", NormalBalance::Credit),
    ("Income", NormalBalance::Credit),
    ("Expenses", NormalBalance::Debit),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ifinance=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = ifinance_db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    seed_categories(&db).await?;
    seed_admin(&db, &config.seed).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_categories(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = CategoryRepository::new(db.clone());

    for (name, side) in DEFAULT_CATEGORIES {
        if repo.find_by_name(name).await?.is_some() {
            info!(name, "Account category already exists, skipping");
            continue;
        }
        repo.create(name, side)
            .await
            .with_context(|| format!("Failed to create category {name}"))?;
        info!(name, normal_balance = ?side, "Created account category");
    }
    Ok(())
}

async fn seed_admin(db: &DatabaseConnection, seed: &SeedConfig) -> anyhow::Result<()> {
    let repo = UserRepository::new(db.clone());

    if repo.username_exists(&seed.admin_username).await? {
        info!(username = %seed.admin_username, "Admin already exists, skipping");
        return Ok(());
    }

    let password_hash = hash_password(&seed.admin_password)?;
    let admin = repo
        .create(CreateUserInput {
            name: "Administrator".to_string(),
            username: seed.admin_username.clone(),
            password_hash,
            role: UserRole::Admin,
            email: None,
            address: None,
            date_hired: None,
        })
        .await
        .context("Failed to create admin")?;

    info!(user_id = %admin.id, username = %admin.username, "Created admin user");
    Ok(())
}
