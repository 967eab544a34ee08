//! Route definitions for the `/users` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET, PUT /me            -> me, update_me
/// PUT      /{id}/roles    -> assign_roles
/// POST     /{id}/lock     -> lock
/// POST     /{id}/unlock   -> unlock
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::me).put(users::update_me))
        .route("/{id}/roles", put(users::assign_roles))
        .route("/{id}/lock", post(users::lock))
        .route("/{id}/unlock", post(users::unlock))
}
