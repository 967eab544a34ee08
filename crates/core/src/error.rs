use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Request-scoped authentication and token failures.
///
/// An unknown email and a wrong password both surface as
/// [`AuthError::BadCredentials`] so callers cannot tell which part failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    BadCredentials,

    #[error("Account is locked")]
    AccountLocked,

    #[error("Account is not activated")]
    AccountDisabled,

    #[error("Invalid activation token")]
    TokenNotFound,

    #[error("Activation token has expired. A new token has been sent to the same email address")]
    TokenExpired,

    #[error("Activation token has already been used")]
    TokenAlreadyValidated,

    #[error("Full authentication is required to access this resource")]
    MissingCredentials,

    #[error("Invalid or expired access token")]
    InvalidAccessToken,
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AccountLocked | AuthError::AccountDisabled => {
                CoreError::Forbidden(err.to_string())
            }
            _ => CoreError::Unauthorized(err.to_string()),
        }
    }
}
