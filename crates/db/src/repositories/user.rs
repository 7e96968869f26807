//! User repository for database operations.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{sea_orm_active_enums::UserRole, users};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Username already taken.
    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),

    /// Regular users need an email address.
    #[error("Email is required for non-admin users")]
    EmailRequired,

    /// Name or username is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Display name.
    pub name: String,
    /// Login name (unique).
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Role.
    pub role: UserRole,
    /// Email address.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Hire date.
    pub date_hired: Option<NaiveDate>,
}

/// Input for updating a user's profile.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<Option<String>>,
    /// Postal address.
    pub address: Option<Option<String>>,
    /// Last working day.
    pub date_finished: Option<Option<NaiveDate>>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all users ordered by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
    }

    /// Checks if a username is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Name or username is blank
    /// - Username already exists
    /// - A non-admin user has no email
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        let name = input.name.trim();
        let username = input.username.trim();
        if name.is_empty() {
            return Err(UserError::MissingField("name"));
        }
        if username.is_empty() {
            return Err(UserError::MissingField("username"));
        }
        let email = input.email.filter(|e| !e.trim().is_empty());
        if input.role == UserRole::User && email.is_none() {
            return Err(UserError::EmailRequired);
        }
        if self.username_exists(username).await? {
            return Err(UserError::DuplicateUsername(username.to_string()));
        }

        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            username: Set(username.to_string()),
            password_hash: Set(input.password_hash),
            role: Set(input.role),
            email: Set(email),
            address: Set(input.address),
            date_hired: Set(input.date_hired),
            date_finished: Set(None),
            created_at: Set(chrono::Utc::now()),
        };

        Ok(user.insert(&self.db).await?)
    }

    /// Updates profile fields of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub async fn update(&self, id: Uuid, input: UpdateUserInput) -> Result<users::Model, UserError> {
        let user = self.find_by_id(id).await?.ok_or(UserError::NotFound(id))?;
        let role = user.role;
        let mut active: users::ActiveModel = user.into();

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(UserError::MissingField("name"));
            }
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            let email = email.filter(|e| !e.trim().is_empty());
            if role == UserRole::User && email.is_none() {
                return Err(UserError::EmailRequired);
            }
            active.email = Set(email);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(date_finished) = input.date_finished {
            active.date_finished = Set(date_finished);
        }

        Ok(active.update(&self.db).await?)
    }

    /// Replaces a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub async fn update_password(&self, id: Uuid, password_hash: String) -> Result<(), UserError> {
        let user = self.find_by_id(id).await?.ok_or(UserError::NotFound(id))?;
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.update(&self.db).await?;
        Ok(())
    }

    /// Deletes a user and, through cascading keys, their books.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<(), UserError> {
        let result = users::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }
}
