//! Stateless request gate.
//!
//! Every request starts unauthenticated. Paths on the public allow-list are
//! served as-is. Any other request must present `Authorization: Bearer <jwt>`.
//! A token with a valid signature and expiry only names a user: the user is
//! reloaded from the credential store, must still be unlocked and enabled, and
//! gets the authorities of the roles it holds now. The resulting [`AuthUser`]
//! is stored in the request extensions. Nothing is remembered between requests.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use booknet_core::access::RequestAccess;
use booknet_core::error::AuthError;

use super::auth::AuthUser;
use crate::auth::jwt::{validate_token, Claims, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Gate middleware, installed with `axum::middleware::from_fn_with_state`.
pub async fn request_gate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if state.access_policy.classify(req.uri().path()) == RequestAccess::Public {
        return next.run(req).await;
    }

    let claims = match decode_bearer(req.headers(), &state.config.jwt) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(path = %req.uri().path(), reason = %err, "Request rejected by gate");
            return AppError::from(err).into_response();
        }
    };

    match state.authenticator.resolve(claims.sub).await {
        Ok(principal) => {
            tracing::debug!(user_id = principal.user_id, "Request authenticated");
            req.extensions_mut().insert(AuthUser::from(principal));
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!(user_id = claims.sub, reason = %err, "Token owner refused by gate");
            AppError::from(err).into_response()
        }
    }
}

/// Verify the `Authorization: Bearer` token and return its claims.
pub fn decode_bearer(headers: &HeaderMap, jwt: &JwtConfig) -> Result<Claims, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    validate_token(token, jwt).map_err(|_| AuthError::InvalidAccessToken)
}
