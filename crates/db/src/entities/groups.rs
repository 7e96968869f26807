//! `SeaORM` Entity for groups table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub account_category_id: Uuid,
    pub parent_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::account_categories::Entity",
        from = "Column::AccountCategoryId",
        to = "super::account_categories::Column::Id"
    )]
    AccountCategories,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    SelfRef,
    #[sea_orm(has_many = "super::master_accounts::Entity")]
    MasterAccounts,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::account_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountCategories.def()
    }
}

impl Related<super::master_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MasterAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
