//! User management routes (administrators only).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::nullable;
use crate::{AppState, error::ApiError, middleware::AuthUser};
use ifinance_core::auth::hash_password;
use ifinance_db::{
    UserRepository,
    entities::{sea_orm_active_enums::UserRole, users},
    repositories::{CreateUserInput, UpdateUserInput, UserError},
};

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Display name.
    pub name: String,
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Role; defaults to `user`.
    #[serde(default = "default_role")]
    pub role: UserRole,
    /// Contact email, required for the `user` role.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Hire date.
    pub date_hired: Option<NaiveDate>,
}

const fn default_role() -> UserRole {
    UserRole::User
}

/// Request body for updating a user. `null` clears an optional field.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// Display name.
    pub name: Option<String>,
    /// Contact email.
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    /// Postal address.
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    /// End of employment.
    #[serde(default, deserialize_with = "nullable")]
    pub date_finished: Option<Option<NaiveDate>>,
}

/// GET /users
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<users::Model>>, ApiError> {
    auth.require_admin()?;
    let users = UserRepository::new((*state.db).clone()).list().await?;
    Ok(Json(users))
}

/// POST /users
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<users::Model>), ApiError> {
    auth.require_admin()?;
    let password_hash = hash_password(&payload.password)?;

    let user = UserRepository::new((*state.db).clone())
        .create(CreateUserInput {
            name: payload.name,
            username: payload.username,
            password_hash,
            role: payload.role,
            email: payload.email,
            address: payload.address,
            date_hired: payload.date_hired,
        })
        .await?;

    info!(admin_id = %auth.user_id(), user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/{user_id}
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<users::Model>, ApiError> {
    auth.require_admin()?;
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(user_id)
        .await?
        .ok_or(UserError::NotFound(user_id))?;
    Ok(Json(user))
}

/// PUT /users/{user_id}
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<users::Model>, ApiError> {
    auth.require_admin()?;
    let user = UserRepository::new((*state.db).clone())
        .update(
            user_id,
            UpdateUserInput {
                name: payload.name,
                email: payload.email,
                address: payload.address,
                date_finished: payload.date_finished,
            },
        )
        .await?;

    info!(admin_id = %auth.user_id(), user_id = %user_id, "User updated");
    Ok(Json(user))
}

/// DELETE /users/{user_id}
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    UserRepository::new((*state.db).clone())
        .delete(user_id)
        .await?;

    info!(admin_id = %auth.user_id(), user_id = %user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
