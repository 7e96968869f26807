//! Initial database migration.
//!
//! Creates users, the chart of accounts (categories, groups, master accounts)
//! and the transaction tables. Built with the schema builder so the same
//! migration runs on Postgres and SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: USERS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255))
                    .col(ColumnDef::new(Users::Address).text())
                    .col(ColumnDef::new(Users::DateHired).date())
                    .col(ColumnDef::new(Users::DateFinished).date())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(AccountCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountCategories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountCategories::Name)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(AccountCategories::NormalBalance)
                            .string_len(16)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Groups::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Groups::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Groups::AccountCategoryId).uuid().not_null())
                    .col(ColumnDef::new(Groups::ParentId).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_groups_owner")
                            .from(Groups::Table, Groups::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_groups_category")
                            .from(Groups::Table, Groups::AccountCategoryId)
                            .to(AccountCategories::Table, AccountCategories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_groups_parent")
                            .from(Groups::Table, Groups::ParentId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_groups_owner_name")
                    .table(Groups::Table)
                    .col(Groups::OwnerId)
                    .col(Groups::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MasterAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MasterAccounts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MasterAccounts::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(MasterAccounts::GroupId).uuid().not_null())
                    .col(ColumnDef::new(MasterAccounts::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(MasterAccounts::OpeningAmount)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MasterAccounts::ClosingAmount)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MasterAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MasterAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_master_accounts_owner")
                            .from(MasterAccounts::Table, MasterAccounts::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_master_accounts_group")
                            .from(MasterAccounts::Table, MasterAccounts::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_master_accounts_owner")
                    .table(MasterAccounts::Table)
                    .col(MasterAccounts::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: TRANSACTIONS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(ColumnDef::new(Transactions::Description).text().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_owner")
                            .from(Transactions::Table, Transactions::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_owner_date")
                    .table(Transactions::Table)
                    .col(Transactions::OwnerId)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionLines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransactionLines::TransactionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionLines::MasterAccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionLines::DebitedAmount)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionLines::CreditedAmount)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionLines::Comment).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_lines_transaction")
                            .from(TransactionLines::Table, TransactionLines::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_lines_account")
                            .from(TransactionLines::Table, TransactionLines::MasterAccountId)
                            .to(MasterAccounts::Table, MasterAccounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_lines_transaction")
                    .table(TransactionLines::Table)
                    .col(TransactionLines::TransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_lines_account")
                    .table(TransactionLines::Table)
                    .col(TransactionLines::MasterAccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            TransactionLines::Table.into_iden(),
            Transactions::Table.into_iden(),
            MasterAccounts::Table.into_iden(),
            Groups::Table.into_iden(),
            AccountCategories::Table.into_iden(),
            Users::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Username,
    PasswordHash,
    Role,
    Email,
    Address,
    DateHired,
    DateFinished,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AccountCategories {
    Table,
    Id,
    Name,
    NormalBalance,
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    Id,
    OwnerId,
    Name,
    AccountCategoryId,
    ParentId,
}

#[derive(DeriveIden)]
enum MasterAccounts {
    Table,
    Id,
    OwnerId,
    GroupId,
    Name,
    OpeningAmount,
    ClosingAmount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    OwnerId,
    Date,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TransactionLines {
    Table,
    Id,
    TransactionId,
    MasterAccountId,
    DebitedAmount,
    CreditedAmount,
    Comment,
}
