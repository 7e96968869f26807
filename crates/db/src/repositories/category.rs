//! Account category repository.
//!
//! Categories are global; groups point at them to pick a normal balance side.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use ifinance_core::chart::{ChartError, normalize_name};

use crate::entities::{account_categories, groups, sea_orm_active_enums::NormalBalance};

/// Error types for category operations.
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// Category not found.
    #[error("Account category not found: {0}")]
    NotFound(Uuid),

    /// Name already used by another category.
    #[error("Account category '{0}' already exists")]
    DuplicateName(String),

    /// Groups still reference the category.
    #[error("Cannot delete account category: {0} groups reference it")]
    InUse(u64),

    /// Chart rule violated.
    #[error(transparent)]
    Invalid(#[from] ChartError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for updating a category.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// New name.
    pub name: Option<String>,
    /// New normal balance side.
    pub normal_balance: Option<NormalBalance>,
}

/// Account category repository.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<account_categories::Model>, DbErr> {
        account_categories::Entity::find()
            .order_by_asc(account_categories::Column::Name)
            .all(&self.db)
            .await
    }

    /// Finds a category by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<account_categories::Model>, DbErr> {
        account_categories::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a category by exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<account_categories::Model>, DbErr> {
        account_categories::Entity::find()
            .filter(account_categories::Column::Name.eq(name))
            .one(&self.db)
            .await
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or already used.
    pub async fn create(
        &self,
        name: &str,
        normal_balance: NormalBalance,
    ) -> Result<account_categories::Model, CategoryError> {
        let name = normalize_name(name)?;
        if self.find_by_name(&name).await?.is_some() {
            return Err(CategoryError::DuplicateName(name));
        }

        let category = account_categories::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name),
            normal_balance: Set(normal_balance),
        };
        Ok(category.insert(&self.db).await?)
    }

    /// Updates a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the category does not exist or the new name is
    /// blank or taken.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<account_categories::Model, CategoryError> {
        let category = self
            .find_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound(id))?;
        let mut active: account_categories::ActiveModel = category.into();

        if let Some(name) = input.name {
            let name = normalize_name(&name)?;
            if let Some(other) = self.find_by_name(&name).await?
                && other.id != id
            {
                return Err(CategoryError::DuplicateName(name));
            }
            active.name = Set(name);
        }
        if let Some(normal_balance) = input.normal_balance {
            active.normal_balance = Set(normal_balance);
        }

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a category no group references.
    ///
    /// # Errors
    ///
    /// Returns an error if the category does not exist or is in use.
    pub async fn delete(&self, id: Uuid) -> Result<(), CategoryError> {
        let in_use = groups::Entity::find()
            .filter(groups::Column::AccountCategoryId.eq(id))
            .count(&self.db)
            .await?;
        if in_use > 0 {
            return Err(CategoryError::InUse(in_use));
        }

        let result = account_categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(CategoryError::NotFound(id));
        }
        Ok(())
    }
}
