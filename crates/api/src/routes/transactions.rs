//! Transaction routes.
//!
//! Every mutation goes through the transaction engine, which posts line
//! amounts to master account balances inside the same database transaction.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use ifinance_core::ledger::{TransactionInput, TransactionWithLines};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/{transaction_id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

/// Transaction with its lines and totals.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Header and lines.
    #[serde(flatten)]
    pub transaction: TransactionWithLines,
    /// Sum of debited amounts.
    pub total_debit: Decimal,
    /// Sum of credited amounts.
    pub total_credit: Decimal,
}

impl From<TransactionWithLines> for TransactionResponse {
    fn from(transaction: TransactionWithLines) -> Self {
        Self {
            total_debit: transaction.total_debit(),
            total_credit: transaction.total_credit(),
            transaction,
        }
    }
}

/// GET `/transactions` - The caller's transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let principal = auth.principal()?;
    let transactions = state.engine().list(&principal).await?;
    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// POST `/transactions` - Record a balanced transaction.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TransactionInput>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let principal = auth.principal()?;
    let created = state.engine().create(&principal, &payload).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET `/transactions/{transaction_id}`
async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let principal = auth.principal()?;
    let transaction = state.engine().get(&principal, transaction_id).await?;
    Ok(Json(transaction.into()))
}

/// PUT `/transactions/{transaction_id}` - Replace header and reconcile lines.
async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<TransactionInput>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let principal = auth.principal()?;
    let updated = state
        .engine()
        .update(&principal, transaction_id, &payload)
        .await?;
    Ok(Json(updated.into()))
}

/// DELETE `/transactions/{transaction_id}` - Delete and reverse every line.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let principal = auth.principal()?;
    state.engine().delete(&principal, transaction_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
