//! Handlers for the `/auth` resource (register, authenticate, activate).
//!
//! Every route here is on the public allow-list.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use booknet_core::error::CoreError;
use booknet_core::roles::ROLE_USER;
use booknet_core::validation::not_blank;
use booknet_db::is_unique_violation;
use booknet_db::models::user::CreateUser;
use booknet_db::repositories::UserRepo;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::activation::Activation;
use crate::auth::jwt::generate_access_token;
use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(custom(function = "not_blank", message = "Firstname is mandatory"))]
    pub firstname: String,
    #[validate(custom(function = "not_blank", message = "Lastname is mandatory"))]
    pub lastname: String,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(email(message = "Email is not well formatted"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password should be 8 characters long minimum"))]
    pub password: String,
}

/// Request body for `POST /auth/authenticate`.
#[derive(Debug, Deserialize)]
pub struct AuthenticationRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthenticationResponse {
    pub token: String,
}

/// Query string for `GET /auth/activate-account`.
#[derive(Debug, Deserialize)]
pub struct ActivationQuery {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create a disabled account holding the `USER` role and send it an
/// activation code. Returns 202 Accepted with no body.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegistrationRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        firstname: input.firstname.trim().to_string(),
        lastname: input.lastname.trim().to_string(),
        date_of_birth: input.date_of_birth,
        email: input.email.trim().to_string(),
        password_hash,
        enabled: false,
    };

    let user = match UserRepo::create_with_roles(&state.pool, &create_dto, &[ROLE_USER]).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e, "uq_users_email") => {
            return Err(AppError::Core(CoreError::Conflict(
                "Email is already registered".into(),
            )));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = user.id, "User registered");

    Activation {
        pool: &state.pool,
        config: &state.config.activation,
        mailer: state.mailer.as_deref(),
    }
    .issue(&user)
    .await?;

    Ok(StatusCode::ACCEPTED)
}

/// POST /auth/authenticate
///
/// Exchange email + password for a signed access token.
pub async fn authenticate(
    State(state): State<AppState>,
    Json(input): Json<AuthenticationRequest>,
) -> AppResult<Json<AuthenticationResponse>> {
    let principal = state
        .authenticator
        .authenticate(input.email.trim(), &input.password)
        .await?;

    let token = generate_access_token(&principal, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(AuthenticationResponse { token }))
}

/// GET /auth/activate-account?token=
pub async fn activate_account(
    State(state): State<AppState>,
    Query(query): Query<ActivationQuery>,
) -> AppResult<StatusCode> {
    Activation {
        pool: &state.pool,
        config: &state.config.activation,
        mailer: state.mailer.as_deref(),
    }
    .activate(query.token.trim())
    .await?;

    Ok(StatusCode::OK)
}
