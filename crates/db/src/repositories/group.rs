//! Group repository: the per-owner hierarchy accounts hang from.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use ifinance_core::chart::{ChartError, check_parent, normalize_name};

use crate::entities::{account_categories, groups, master_accounts};

/// Error types for group operations.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    /// Group not found for this owner.
    #[error("Group not found: {0}")]
    NotFound(Uuid),

    /// Owner already has a group with this name.
    #[error("Group '{0}' already exists")]
    DuplicateName(String),

    /// Account category not found.
    #[error("Account category not found: {0}")]
    CategoryNotFound(Uuid),

    /// Parent group not found for this owner.
    #[error("Parent group not found: {0}")]
    ParentNotFound(Uuid),

    /// Master accounts still reference the group.
    #[error("Cannot delete group: {0} master accounts reference it")]
    HasAccounts(u64),

    /// Child groups still reference the group.
    #[error("Cannot delete group: {0} child groups reference it")]
    HasChildren(u64),

    /// Chart rule violated.
    #[error(transparent)]
    Invalid(#[from] ChartError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a group.
#[derive(Debug, Clone)]
pub struct CreateGroupInput {
    /// Group name (unique per owner).
    pub name: String,
    /// Account category.
    pub account_category_id: Uuid,
    /// Parent group.
    pub parent_id: Option<Uuid>,
}

/// Input for updating a group.
#[derive(Debug, Clone, Default)]
pub struct UpdateGroupInput {
    /// Group name.
    pub name: Option<String>,
    /// Account category.
    pub account_category_id: Option<Uuid>,
    /// Parent group (`Some(None)` detaches).
    pub parent_id: Option<Option<Uuid>>,
}

/// Group repository, scoped by owner on every call.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    db: DatabaseConnection,
}

impl GroupRepository {
    /// Creates a new group repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists an owner's groups ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<groups::Model>, DbErr> {
        groups::Entity::find()
            .filter(groups::Column::OwnerId.eq(owner_id))
            .order_by_asc(groups::Column::Name)
            .all(&self.db)
            .await
    }

    /// Finds an owner's group by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Option<groups::Model>, DbErr> {
        groups::Entity::find_by_id(id)
            .filter(groups::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await
    }

    /// Creates a group.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Name is blank or already used by this owner
    /// - Category does not exist
    /// - Parent group does not exist for this owner
    pub async fn create(
        &self,
        owner_id: Uuid,
        input: CreateGroupInput,
    ) -> Result<groups::Model, GroupError> {
        let name = normalize_name(&input.name)?;
        self.ensure_unique_name(owner_id, &name, None).await?;
        self.ensure_category(input.account_category_id).await?;
        if let Some(parent_id) = input.parent_id {
            self.ensure_parent(owner_id, parent_id).await?;
        }

        let group = groups::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner_id),
            name: Set(name),
            account_category_id: Set(input.account_category_id),
            parent_id: Set(input.parent_id),
        };
        Ok(group.insert(&self.db).await?)
    }

    /// Updates a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist for this owner, or the
    /// new values break a chart rule.
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        input: UpdateGroupInput,
    ) -> Result<groups::Model, GroupError> {
        let group = self
            .find(owner_id, id)
            .await?
            .ok_or(GroupError::NotFound(id))?;
        let mut active: groups::ActiveModel = group.into();

        if let Some(name) = input.name {
            let name = normalize_name(&name)?;
            self.ensure_unique_name(owner_id, &name, Some(id)).await?;
            active.name = Set(name);
        }
        if let Some(category_id) = input.account_category_id {
            self.ensure_category(category_id).await?;
            active.account_category_id = Set(category_id);
        }
        if let Some(parent_id) = input.parent_id {
            check_parent(id, parent_id)?;
            if let Some(parent_id) = parent_id {
                self.ensure_parent(owner_id, parent_id).await?;
            }
            active.parent_id = Set(parent_id);
        }

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a group with no accounts and no child groups.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist for this owner or is
    /// still referenced.
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), GroupError> {
        self.find(owner_id, id)
            .await?
            .ok_or(GroupError::NotFound(id))?;

        let accounts = master_accounts::Entity::find()
            .filter(master_accounts::Column::GroupId.eq(id))
            .count(&self.db)
            .await?;
        if accounts > 0 {
            return Err(GroupError::HasAccounts(accounts));
        }

        let children = groups::Entity::find()
            .filter(groups::Column::ParentId.eq(id))
            .count(&self.db)
            .await?;
        if children > 0 {
            return Err(GroupError::HasChildren(children));
        }

        groups::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn ensure_unique_name(
        &self,
        owner_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<(), GroupError> {
        let mut query = groups::Entity::find()
            .filter(groups::Column::OwnerId.eq(owner_id))
            .filter(groups::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(groups::Column::Id.ne(id));
        }

        if query.one(&self.db).await?.is_some() {
            return Err(GroupError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    async fn ensure_category(&self, id: Uuid) -> Result<(), GroupError> {
        account_categories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(GroupError::CategoryNotFound(id))
    }

    async fn ensure_parent(&self, owner_id: Uuid, parent_id: Uuid) -> Result<(), GroupError> {
        self.find(owner_id, parent_id)
            .await?
            .map(|_| ())
            .ok_or(GroupError::ParentNotFound(parent_id))
    }
}
