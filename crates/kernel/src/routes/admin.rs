//! Role administration API.
//!
//! Access is checked with the same pattern matching as page navigation,
//! against the fixed keys `admin.roles` and `admin.users`.

use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Role, UserWithRole};
use crate::routes::helpers::require_access;
use crate::session::SessionSnapshot;
use crate::state::AppState;

/// Access key guarding role listings.
pub const ROLES_ACCESS_KEY: &str = "admin.roles";

/// Access key guarding user role assignment.
pub const USERS_ACCESS_KEY: &str = "admin.users";

#[derive(Debug, Default, Deserialize)]
pub struct ListRolesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/admin/roles
async fn list_roles(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
    Query(query): Query<ListRolesQuery>,
) -> AppResult<Json<Vec<Role>>> {
    require_access(&snapshot, ROLES_ACCESS_KEY)?;
    Ok(Json(state.roles().list_roles(query.include_inactive).await?))
}

/// GET /api/admin/roles/{id}/users
async fn role_users(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
    Path(role_id): Path<String>,
) -> AppResult<Json<Vec<UserWithRole>>> {
    require_access(&snapshot, ROLES_ACCESS_KEY)?;
    if state.roles().find_role(&role_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    Ok(Json(state.roles().users_with_role(&role_id).await?))
}

/// GET /api/admin/users
async fn list_users(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
) -> AppResult<Json<Vec<UserWithRole>>> {
    require_access(&snapshot, USERS_ACCESS_KEY)?;
    Ok(Json(state.roles().list_users_with_roles().await?))
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role_id: String,
}

/// PUT /api/admin/users/{id}/role
async fn assign_role(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AssignRoleRequest>,
) -> AppResult<Json<UserWithRole>> {
    let admin = require_access(&snapshot, USERS_ACCESS_KEY)?;

    if state.roles().find_role(&request.role_id).await?.is_none() {
        return Err(AppError::BadRequest(format!("unknown role {}", request.role_id)));
    }

    let updated = state
        .roles()
        .assign_role(user_id, &request.role_id)
        .await?
        .ok_or(AppError::NotFound)?;

    info!(
        admin = %admin.user_id,
        user_id = %user_id,
        role = %request.role_id,
        "role assignment changed"
    );
    Ok(Json(updated))
}

/// DELETE /api/admin/users/{id}/role
async fn remove_role(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserWithRole>> {
    let admin = require_access(&snapshot, USERS_ACCESS_KEY)?;

    let updated = state
        .roles()
        .remove_role(user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    info!(admin = %admin.user_id, user_id = %user_id, "role assignment removed");
    Ok(Json(updated))
}

/// Create the admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/roles", get(list_roles))
        .route("/api/admin/roles/{id}/users", get(role_users))
        .route("/api/admin/users", get(list_users))
        .route(
            "/api/admin/users/{id}/role",
            put(assign_role).delete(remove_role),
        )
}
