pub mod auth;
pub mod roles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                  register (public)
/// /auth/authenticate              authenticate (public)
/// /auth/activate-account          activate account (public)
///
/// /users/me                       get, update own profile
/// /users/{id}/roles               replace role set (admin only)
/// /users/{id}/lock                lock account (admin only)
/// /users/{id}/unlock              unlock account (admin only)
///
/// /roles                          list, create (create is admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/roles", roles::router())
}
