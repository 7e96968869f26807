//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware and the `AuthUser` extractor
//! - Error to response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ifinance_db::SeaOrmLedgerStore;
use ifinance_core::ledger::TransactionEngine;
use ifinance_shared::JwtService;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    /// Creates the state from a connection and a JWT service.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
        }
    }

    /// Transaction engine over the shared connection.
    #[must_use]
    pub fn engine(&self) -> TransactionEngine<SeaOrmLedgerStore> {
        TransactionEngine::new(SeaOrmLedgerStore::new((*self.db).clone()))
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
