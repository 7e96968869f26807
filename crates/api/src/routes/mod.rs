//! API route definitions.

use axum::{Router, middleware};
use serde::{Deserialize, Deserializer};

use crate::{AppState, middleware::auth_middleware};

pub mod account_categories;
pub mod auth;
pub mod groups;
pub mod health;
pub mod master_accounts;
pub mod reports;
pub mod transactions;
pub mod users;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(users::routes())
        .merge(account_categories::routes())
        .merge(groups::routes())
        .merge(master_accounts::routes())
        .merge(transactions::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Tells an absent field (`None`) apart from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
