//! Authentication routes for login, password change and the current user.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, error::ApiError, middleware::AuthUser};
use ifinance_core::auth::{UserRole, hash_password, verify_password};
use ifinance_db::{UserRepository, entities::users, repositories::UserError};
use ifinance_shared::{
    AppError,
    auth::{ChangePasswordRequest, LoginRequest, LoginResponse, UserInfo},
};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Creates the auth routes that need a valid token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/change-password", post(change_password))
        .route("/auth/me", get(me))
}

pub(crate) fn user_info(user: users::Model) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username,
        name: user.name,
        email: user.email,
        role: UserRole::from(user.role).as_str().to_string(),
    }
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid username or password"
        })),
    )
        .into_response()
}

/// POST /auth/login - Authenticate user and return a token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let user_repo = UserRepository::new((*state.db).clone());

    let Some(user) = user_repo.find_by_username(payload.username.trim()).await? else {
        info!(username = %payload.username, "Login attempt for non-existent user");
        return Ok(invalid_credentials());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Ok(invalid_credentials());
    }

    let role = UserRole::from(user.role);
    let token = state
        .jwt_service
        .generate_token(user.id, role.as_str())
        .map_err(|e| {
            error!(error = %e, "Failed to generate token");
            ApiError::App(AppError::Internal(e.to_string()))
        })?;

    info!(user_id = %user.id, "User logged in successfully");

    let response = LoginResponse {
        token,
        user: user_info(user),
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// POST /auth/change-password - Replace the caller's password.
async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let user_repo = UserRepository::new((*state.db).clone());
    let user_id = auth.user_id();

    let user = user_repo
        .find_by_id(user_id)
        .await?
        .ok_or(UserError::NotFound(user_id))?;

    if !verify_password(&payload.old_password, &user.password_hash)? {
        return Err(ApiError::App(AppError::Validation(
            "Current password is incorrect".to_string(),
        )));
    }

    let password_hash = hash_password(&payload.new_password)?;
    user_repo.update_password(user_id, password_hash).await?;

    info!(user_id = %user_id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - Current user.
async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserInfo>, ApiError> {
    let user_id = auth.user_id();
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(user_id)
        .await?
        .ok_or(UserError::NotFound(user_id))?;

    Ok(Json(user_info(user)))
}
