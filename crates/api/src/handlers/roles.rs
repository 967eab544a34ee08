//! Handlers for the `/roles` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use booknet_core::error::CoreError;
use booknet_db::is_unique_violation;
use booknet_db::models::role::{CreateRole, Role};
use booknet_db::repositories::RoleRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /roles
pub async fn list(State(state): State<AppState>, _user: AuthUser) -> AppResult<Json<Vec<Role>>> {
    Ok(Json(RoleRepo::list(&state.pool).await?))
}

/// POST /roles
///
/// Role names are unique; a duplicate yields 409 Conflict.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateRole>,
) -> AppResult<(StatusCode, Json<Role>)> {
    input.validate()?;

    let dto = CreateRole {
        name: input.name.trim().to_string(),
    };
    let role = match RoleRepo::create(&state.pool, &dto).await {
        Ok(role) => role,
        Err(e) if is_unique_violation(&e, "uq_roles_name") => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Role '{}' already exists",
                dto.name
            ))));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(admin_id = admin.user_id, role = %role.name, "Role created");

    Ok((StatusCode::CREATED, Json(role)))
}
