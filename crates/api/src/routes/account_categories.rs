//! Account category routes.
//!
//! Categories are shared by every user; only administrators change them.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use ifinance_db::{
    CategoryRepository,
    entities::{account_categories, sea_orm_active_enums::NormalBalance},
    repositories::{CategoryError, UpdateCategoryInput},
};

/// Creates the account category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/account-categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/account-categories/{category_id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}

/// Request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// Category name, unique.
    pub name: String,
    /// `debit` or `credit`.
    pub normal_balance: NormalBalance,
}

/// Request body for updating a category.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    /// New name.
    pub name: Option<String>,
    /// New normal balance side.
    pub normal_balance: Option<NormalBalance>,
}

async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<account_categories::Model>>, ApiError> {
    let categories = CategoryRepository::new((*state.db).clone()).list().await?;
    Ok(Json(categories))
}

async fn get_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<account_categories::Model>, ApiError> {
    let category = CategoryRepository::new((*state.db).clone())
        .find_by_id(category_id)
        .await?
        .ok_or(CategoryError::NotFound(category_id))?;
    Ok(Json(category))
}

async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<account_categories::Model>), ApiError> {
    auth.require_admin()?;
    let category = CategoryRepository::new((*state.db).clone())
        .create(&payload.name, payload.normal_balance)
        .await?;

    info!(category_id = %category.id, name = %category.name, "Account category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<account_categories::Model>, ApiError> {
    auth.require_admin()?;
    let category = CategoryRepository::new((*state.db).clone())
        .update(
            category_id,
            UpdateCategoryInput {
                name: payload.name,
                normal_balance: payload.normal_balance,
            },
        )
        .await?;

    info!(category_id = %category_id, "Account category updated");
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    CategoryRepository::new((*state.db).clone())
        .delete(category_id)
        .await?;

    info!(category_id = %category_id, "Account category deleted");
    Ok(StatusCode::NO_CONTENT)
}
