//! Chart-of-accounts group routes, scoped to the caller.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::nullable;
use crate::{AppState, error::ApiError, middleware::AuthUser};
use ifinance_db::{
    GroupRepository,
    entities::groups,
    repositories::{CreateGroupInput, GroupError, UpdateGroupInput},
};

/// Creates the group routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route(
            "/groups/{group_id}",
            get(get_group).put(update_group).delete(delete_group),
        )
}

/// Request body for creating a group.
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    /// Group name, unique per owner.
    pub name: String,
    /// Category the group belongs to.
    pub account_category_id: Uuid,
    /// Optional parent group.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Request body for updating a group. `"parent_id": null` detaches it.
#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    /// New name.
    pub name: Option<String>,
    /// New category.
    pub account_category_id: Option<Uuid>,
    /// New parent.
    #[serde(default, deserialize_with = "nullable")]
    pub parent_id: Option<Option<Uuid>>,
}

async fn list_groups(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<groups::Model>>, ApiError> {
    let groups = GroupRepository::new((*state.db).clone())
        .list(auth.user_id())
        .await?;
    Ok(Json(groups))
}

async fn get_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<groups::Model>, ApiError> {
    let group = GroupRepository::new((*state.db).clone())
        .find(auth.user_id(), group_id)
        .await?
        .ok_or(GroupError::NotFound(group_id))?;
    Ok(Json(group))
}

async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<groups::Model>), ApiError> {
    let group = GroupRepository::new((*state.db).clone())
        .create(
            auth.user_id(),
            CreateGroupInput {
                name: payload.name,
                account_category_id: payload.account_category_id,
                parent_id: payload.parent_id,
            },
        )
        .await?;

    info!(owner_id = %auth.user_id(), group_id = %group.id, "Group created");
    Ok((StatusCode::CREATED, Json(group)))
}

async fn update_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<UpdateGroupRequest>,
) -> Result<Json<groups::Model>, ApiError> {
    let group = GroupRepository::new((*state.db).clone())
        .update(
            auth.user_id(),
            group_id,
            UpdateGroupInput {
                name: payload.name,
                account_category_id: payload.account_category_id,
                parent_id: payload.parent_id,
            },
        )
        .await?;

    info!(owner_id = %auth.user_id(), group_id = %group_id, "Group updated");
    Ok(Json(group))
}

async fn delete_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    GroupRepository::new((*state.db).clone())
        .delete(auth.user_id(), group_id)
        .await?;

    info!(owner_id = %auth.user_id(), group_id = %group_id, "Group deleted");
    Ok(StatusCode::NO_CONTENT)
}
