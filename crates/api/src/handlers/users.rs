//! Handlers for the `/users` resource.
//!
//! `me` routes act on the caller's own account; the rest require `ADMIN`
//! via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::Json;
use booknet_core::error::CoreError;
use booknet_core::types::DbId;
use booknet_db::models::user::{UpdateProfile, User, UserResponse};
use booknet_db::repositories::{RoleRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Request body for `PUT /users/{id}/roles`.
#[derive(Debug, Deserialize)]
pub struct AssignRolesRequest {
    pub roles: Vec<String>,
}

/// GET /users/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<UserResponse>> {
    let found = find_user(&state, user.user_id).await?;
    Ok(Json(user_to_response(&state, &found).await?))
}

/// PUT /users/me
///
/// Update the caller's own profile. Omitted fields are left unchanged.
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<UserResponse>> {
    input.validate()?;

    let updated = UserRepo::update_profile(&state.pool, user.user_id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        })?;
    tracing::info!(user_id = updated.id, "Profile updated");

    Ok(Json(user_to_response(&state, &updated).await?))
}

/// PUT /users/{id}/roles
///
/// Replace the user's role set. Every named role must exist.
pub async fn assign_roles(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignRolesRequest>,
) -> AppResult<Json<UserResponse>> {
    let roles = RoleRepo::find_by_names(&state.pool, &input.roles).await?;

    let unknown: Vec<&str> = input
        .roles
        .iter()
        .filter(|name| !roles.iter().any(|r| &r.name == *name))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown roles: {}",
            unknown.join(", ")
        ))));
    }

    let role_ids: Vec<DbId> = roles.iter().map(|r| r.id).collect();
    if !RoleRepo::replace_for_user(&state.pool, id, &role_ids).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    tracing::info!(admin_id = admin.user_id, user_id = id, roles = ?input.roles, "User roles replaced");

    let user = find_user(&state, id).await?;
    Ok(Json(user_to_response(&state, &user).await?))
}

/// POST /users/{id}/lock
pub async fn lock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    set_locked(&state, admin, id, true).await
}

/// POST /users/{id}/unlock
pub async fn unlock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    set_locked(&state, admin, id, false).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn set_locked(
    state: &AppState,
    admin: AuthUser,
    id: DbId,
    locked: bool,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::set_locked(&state.pool, id, locked)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    tracing::info!(admin_id = admin.user_id, user_id = id, locked, "Account lock changed");

    Ok(Json(user_to_response(state, &user).await?))
}

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

async fn user_to_response(state: &AppState, user: &User) -> AppResult<UserResponse> {
    let roles = RoleRepo::list_for_user(&state.pool, user.id).await?;
    Ok(UserResponse::new(user, &roles))
}
