//! Activation code issuance and consumption.
//!
//! A freshly registered account is disabled until its owner presents the
//! numeric code mailed to them. Codes expire; presenting an expired code
//! issues a replacement.

use booknet_core::activation::{generate_activation_code, TokenStatus};
use booknet_core::error::{AuthError, CoreError};
use booknet_core::types::DbId;
use booknet_db::is_unique_violation;
use booknet_db::models::token::{CreateToken, Token};
use booknet_db::models::user::User;
use booknet_db::repositories::{TokenRepo, UserRepo};
use booknet_db::DbPool;
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::mail::Mailer;

/// Attempts at drawing a code that does not collide with a stored one.
const MAX_ISSUE_ATTEMPTS: usize = 5;

/// Default activation token lifetime in minutes.
const DEFAULT_TOKEN_TTL_MINS: i64 = 15;

/// Default number of digits in an activation code.
const DEFAULT_CODE_LENGTH: usize = 6;

/// Default front-end page users are pointed at to enter the code.
const DEFAULT_ACTIVATION_URL: &str = "http://localhost:4200/activate-account";

/// Activation token settings.
#[derive(Debug, Clone)]
pub struct ActivationConfig {
    pub token_ttl_mins: i64,
    pub code_length: usize,
    /// Link included in the activation email.
    pub activation_url: String,
}

impl ActivationConfig {
    /// Load activation settings from environment variables.
    ///
    /// | Env Var                     | Default                                   |
    /// |-----------------------------|-------------------------------------------|
    /// | `ACTIVATION_TOKEN_TTL_MINS` | `15`                                      |
    /// | `ACTIVATION_CODE_LENGTH`    | `6`                                       |
    /// | `ACTIVATION_URL`            | `http://localhost:4200/activate-account`  |
    pub fn from_env() -> Self {
        let token_ttl_mins: i64 = std::env::var("ACTIVATION_TOKEN_TTL_MINS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_MINS.to_string())
            .parse()
            .expect("ACTIVATION_TOKEN_TTL_MINS must be a valid i64");

        let code_length: usize = std::env::var("ACTIVATION_CODE_LENGTH")
            .unwrap_or_else(|_| DEFAULT_CODE_LENGTH.to_string())
            .parse()
            .expect("ACTIVATION_CODE_LENGTH must be a valid usize");
        assert!(code_length > 0, "ACTIVATION_CODE_LENGTH must be positive");

        Self {
            token_ttl_mins,
            code_length,
            activation_url: std::env::var("ACTIVATION_URL")
                .unwrap_or_else(|_| DEFAULT_ACTIVATION_URL.to_string()),
        }
    }
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            token_ttl_mins: DEFAULT_TOKEN_TTL_MINS,
            code_length: DEFAULT_CODE_LENGTH,
            activation_url: DEFAULT_ACTIVATION_URL.to_string(),
        }
    }
}

/// Issues and consumes activation tokens.
///
/// Holds its collaborators explicitly; cheap to build per request.
pub struct Activation<'a> {
    pub pool: &'a DbPool,
    pub config: &'a ActivationConfig,
    pub mailer: Option<&'a Mailer>,
}

impl Activation<'_> {
    /// Persist a fresh activation token for `user` and mail it.
    ///
    /// Delivery failures are logged rather than returned: the token is stored
    /// either way and presenting it after expiry issues a new one.
    pub async fn issue(&self, user: &User) -> AppResult<Token> {
        let token = self.store_new_token(user.id).await?;

        match self.mailer {
            Some(mailer) => {
                if let Err(e) = mailer
                    .send_activation_code(
                        &user.email,
                        &user.full_name(),
                        &token.token,
                        &self.config.activation_url,
                    )
                    .await
                {
                    tracing::error!(user_id = user.id, error = %e, "Failed to send activation email");
                }
            }
            None => {
                tracing::warn!(user_id = user.id, "SMTP not configured, activation email skipped");
            }
        }

        Ok(token)
    }

    /// Consume `code`, enabling the owning account.
    pub async fn activate(&self, code: &str) -> AppResult<()> {
        let token = TokenRepo::find_by_token(self.pool, code)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        match token.status(Utc::now()) {
            TokenStatus::Valid => {}
            TokenStatus::Expired => {
                let owner = UserRepo::find_by_id(self.pool, token.user_id)
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "User",
                        id: token.user_id,
                    })?;
                if owner.enabled {
                    tracing::debug!(user_id = owner.id, "Expired token presented for an active account");
                    return Err(AuthError::TokenExpired.into());
                }
                tracing::info!(user_id = owner.id, "Activation token expired, issuing a new one");
                self.issue(&owner).await?;
                return Err(AuthError::TokenExpired.into());
            }
            status => status.into_result()?,
        }

        // The conditional update loses to a concurrent activation of the same code.
        if !TokenRepo::validate_and_enable_owner(self.pool, token.id).await? {
            return Err(AuthError::TokenAlreadyValidated.into());
        }

        tracing::info!(user_id = token.user_id, "Account activated");
        Ok(())
    }

    async fn store_new_token(&self, user_id: DbId) -> AppResult<Token> {
        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let input = CreateToken {
                token: generate_activation_code(self.config.code_length),
                expires_at: Utc::now() + chrono::Duration::minutes(self.config.token_ttl_mins),
                user_id,
            };
            match TokenRepo::create(self.pool, &input).await {
                Ok(token) => return Ok(token),
                Err(e) if is_unique_violation(&e, "uq_tokens_token") => {
                    tracing::debug!(user_id, "Activation code collided, drawing another");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::InternalError(
            "Could not allocate a unique activation code".into(),
        ))
    }
}
