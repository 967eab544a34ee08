//! Authenticated-identity extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use booknet_core::authority::Authorities;
use booknet_core::error::AuthError;
use booknet_core::types::DbId;

use crate::auth::provider::AuthenticatedPrincipal;
use crate::error::AppError;

/// Identity established by the request gate from a JWT Bearer token and the
/// user's current state in the credential store.
///
/// Use this as an extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub email: String,
    /// Authorities granted by the roles the user holds at request time.
    pub authorities: Authorities,
}

impl From<AuthenticatedPrincipal> for AuthUser {
    fn from(principal: AuthenticatedPrincipal) -> Self {
        Self {
            user_id: principal.user_id,
            email: principal.email,
            authorities: principal.authorities,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AuthError::MissingCredentials.into())
    }
}
