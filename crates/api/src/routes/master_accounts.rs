//! Master account routes, scoped to the caller.
//!
//! Closing amounts are read-only here; they move only through transactions
//! and opening amount edits.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use ifinance_db::{
    MasterAccountRepository,
    entities::master_accounts,
    repositories::{CreateMasterAccountInput, MasterAccountError, UpdateMasterAccountInput},
};

/// Creates the master account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/master-accounts", get(list_accounts).post(create_account))
        .route(
            "/master-accounts/{account_id}",
            get(get_account).put(update_account).delete(delete_account),
        )
}

/// Request body for creating a master account.
#[derive(Debug, Deserialize)]
pub struct CreateMasterAccountRequest {
    /// Owning group; must belong to the caller.
    pub group_id: Uuid,
    /// Account name.
    pub name: String,
    /// Balance before any lines.
    #[serde(default)]
    pub opening_amount: Decimal,
}

/// Request body for updating a master account.
#[derive(Debug, Deserialize)]
pub struct UpdateMasterAccountRequest {
    /// New group.
    pub group_id: Option<Uuid>,
    /// New name.
    pub name: Option<String>,
    /// New opening amount.
    pub opening_amount: Option<Decimal>,
}

async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<master_accounts::Model>>, ApiError> {
    let accounts = MasterAccountRepository::new((*state.db).clone())
        .list(auth.user_id())
        .await?;
    Ok(Json(accounts))
}

async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> Result<Json<master_accounts::Model>, ApiError> {
    let account = MasterAccountRepository::new((*state.db).clone())
        .find(auth.user_id(), account_id)
        .await?
        .ok_or(MasterAccountError::NotFound(account_id))?;
    Ok(Json(account))
}

async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateMasterAccountRequest>,
) -> Result<(StatusCode, Json<master_accounts::Model>), ApiError> {
    let account = MasterAccountRepository::new((*state.db).clone())
        .create(
            auth.user_id(),
            CreateMasterAccountInput {
                group_id: payload.group_id,
                name: payload.name,
                opening_amount: payload.opening_amount,
            },
        )
        .await?;

    info!(owner_id = %auth.user_id(), account_id = %account.id, "Master account created");
    Ok((StatusCode::CREATED, Json(account)))
}

async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<UpdateMasterAccountRequest>,
) -> Result<Json<master_accounts::Model>, ApiError> {
    let account = MasterAccountRepository::new((*state.db).clone())
        .update(
            auth.user_id(),
            account_id,
            UpdateMasterAccountInput {
                group_id: payload.group_id,
                name: payload.name,
                opening_amount: payload.opening_amount,
            },
        )
        .await?;

    info!(owner_id = %auth.user_id(), account_id = %account_id, "Master account updated");
    Ok(Json(account))
}

async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    MasterAccountRepository::new((*state.db).clone())
        .delete(auth.user_id(), account_id)
        .await?;

    info!(owner_id = %auth.user_id(), account_id = %account_id, "Master account deleted");
    Ok(StatusCode::NO_CONTENT)
}
