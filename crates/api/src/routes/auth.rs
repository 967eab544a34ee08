//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register          -> register
/// POST /authenticate      -> authenticate
/// GET  /activate-account  -> activate_account
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/authenticate", post(auth::authenticate))
        .route("/activate-account", get(auth::activate_account))
}
