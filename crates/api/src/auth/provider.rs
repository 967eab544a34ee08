//! Email + password authentication.
//!
//! [`AuthenticationProvider`] is built once at startup around a
//! [`CredentialSource`] and shared through the application state. It never
//! tells the caller whether the email or the password was wrong.
//!
//! The same provider re-resolves the identity behind every access token, so
//! locking an account or changing its roles applies to the next request.

use std::sync::Arc;

use async_trait::async_trait;
use booknet_core::authority::{granted_authorities, Authorities};
use booknet_core::error::AuthError;
use booknet_core::types::DbId;
use booknet_db::models::user::User;
use booknet_db::repositories::{RoleRepo, UserRepo};
use booknet_db::DbPool;

use crate::auth::password::verify_password;

/// Well-formed Argon2id digest of no known password, using the default
/// parameters. Verified against on unknown emails.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$kkXa3kboL35cbpt7gcWEkw$1D1p+vvAbE8EGHecfrx6gJnNMPyQLIPwki3ArKzxk5I";

/// The credential view of a user, with roles already materialized.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: DbId,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub enabled: bool,
    pub account_locked: bool,
    pub role_names: Vec<String>,
}

impl UserCredentials {
    fn status(&self) -> Result<(), AuthError> {
        if self.account_locked {
            return Err(AuthError::AccountLocked);
        }
        if !self.enabled {
            return Err(AuthError::AccountDisabled);
        }
        Ok(())
    }

    fn into_principal(self) -> AuthenticatedPrincipal {
        AuthenticatedPrincipal {
            user_id: self.user_id,
            authorities: granted_authorities(&self.role_names),
            email: self.email,
            full_name: self.full_name,
        }
    }
}

/// Identity established by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub user_id: DbId,
    pub email: String,
    pub full_name: String,
    pub authorities: Authorities,
}

/// Where the provider looks users up.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn load_by_email(&self, email: &str) -> Result<Option<UserCredentials>, sqlx::Error>;

    async fn load_by_id(&self, user_id: DbId) -> Result<Option<UserCredentials>, sqlx::Error>;
}

#[async_trait]
impl<T: CredentialSource + ?Sized> CredentialSource for Arc<T> {
    async fn load_by_email(&self, email: &str) -> Result<Option<UserCredentials>, sqlx::Error> {
        (**self).load_by_email(email).await
    }

    async fn load_by_id(&self, user_id: DbId) -> Result<Option<UserCredentials>, sqlx::Error> {
        (**self).load_by_id(user_id).await
    }
}

/// Type-erased source held by the application state.
pub type SharedCredentialSource = Arc<dyn CredentialSource>;

/// [`CredentialSource`] backed by the `users`, `roles`, and `user_roles` tables.
#[derive(Clone)]
pub struct DbCredentialSource {
    pool: DbPool,
}

impl DbCredentialSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_roles(&self, user: User) -> Result<UserCredentials, sqlx::Error> {
        let roles = RoleRepo::list_for_user(&self.pool, user.id).await?;
        Ok(UserCredentials {
            user_id: user.id,
            full_name: user.full_name(),
            email: user.email,
            password_hash: user.password_hash,
            enabled: user.enabled,
            account_locked: user.account_locked,
            role_names: roles.into_iter().map(|r| r.name).collect(),
        })
    }
}

#[async_trait]
impl CredentialSource for DbCredentialSource {
    async fn load_by_email(&self, email: &str) -> Result<Option<UserCredentials>, sqlx::Error> {
        match UserRepo::find_by_email(&self.pool, email).await? {
            Some(user) => Ok(Some(self.with_roles(user).await?)),
            None => Ok(None),
        }
    }

    async fn load_by_id(&self, user_id: DbId) -> Result<Option<UserCredentials>, sqlx::Error> {
        match UserRepo::find_by_id(&self.pool, user_id).await? {
            Some(user) => Ok(Some(self.with_roles(user).await?)),
            None => Ok(None),
        }
    }
}

/// Failure modes of [`AuthenticationProvider`].
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error(transparent)]
    Rejected(#[from] AuthError),

    #[error("Credential lookup failed: {0}")]
    Store(#[from] sqlx::Error),
}

pub struct AuthenticationProvider<S> {
    source: S,
}

impl<S: CredentialSource> AuthenticationProvider<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Authenticate `email` with a plaintext `password`.
    ///
    /// Unknown email and wrong password both fail with
    /// [`AuthError::BadCredentials`]. Locked and disabled accounts are only
    /// reported once the password has been proven.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedPrincipal, AuthenticationError> {
        let Some(credentials) = self.source.load_by_email(email).await? else {
            // Burn a verification so the miss costs about as much as a mismatch.
            verify_password(password, DUMMY_HASH);
            tracing::warn!(email, "Authentication failed");
            return Err(AuthError::BadCredentials.into());
        };

        if !verify_password(password, &credentials.password_hash) {
            tracing::warn!(email, "Authentication failed");
            return Err(AuthError::BadCredentials.into());
        }

        if let Err(e) = credentials.status() {
            tracing::warn!(user_id = credentials.user_id, reason = %e, "Authentication refused");
            return Err(e.into());
        }

        tracing::info!(user_id = credentials.user_id, "User authenticated");
        Ok(credentials.into_principal())
    }

    /// Reload the principal behind an access token.
    ///
    /// Authorities come from the roles held now, not from the token. A user
    /// that no longer exists fails with [`AuthError::InvalidAccessToken`].
    pub async fn resolve(&self, user_id: DbId) -> Result<AuthenticatedPrincipal, AuthenticationError> {
        let credentials = self
            .source
            .load_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidAccessToken)?;
        credentials.status()?;
        Ok(credentials.into_principal())
    }
}
