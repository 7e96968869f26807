//! String-backed enums stored in the database.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "user")]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl From<UserRole> for ifinance_core::auth::UserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::User => Self::User,
        }
    }
}

impl From<ifinance_core::auth::UserRole> for UserRole {
    fn from(role: ifinance_core::auth::UserRole) -> Self {
        match role {
            ifinance_core::auth::UserRole::Admin => Self::Admin,
            ifinance_core::auth::UserRole::User => Self::User,
        }
    }
}

impl From<NormalBalance> for ifinance_core::chart::NormalBalance {
    fn from(side: NormalBalance) -> Self {
        match side {
            NormalBalance::Debit => Self::Debit,
            NormalBalance::Credit => Self::Credit,
        }
    }
}

impl From<ifinance_core::chart::NormalBalance> for NormalBalance {
    fn from(side: ifinance_core::chart::NormalBalance) -> Self {
        match side {
            ifinance_core::chart::NormalBalance::Debit => Self::Debit,
            ifinance_core::chart::NormalBalance::Credit => Self::Credit,
        }
    }
}
