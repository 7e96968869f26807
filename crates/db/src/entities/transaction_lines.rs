//! `SeaORM` Entity for transaction_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub master_account_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub debited_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub credited_amount: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::master_accounts::Entity",
        from = "Column::MasterAccountId",
        to = "super::master_accounts::Column::Id"
    )]
    MasterAccounts,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::master_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MasterAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
