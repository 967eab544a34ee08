//! Activation token model and DTOs.

use booknet_core::activation::TokenStatus;
use booknet_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A token row from the `tokens` table. Always owned by exactly one user.
#[derive(Debug, Clone, FromRow)]
pub struct Token {
    pub id: DbId,
    pub token: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    /// Set once, when the token is consumed.
    pub validated_at: Option<Timestamp>,
    pub user_id: DbId,
}

impl Token {
    pub fn status(&self, now: Timestamp) -> TokenStatus {
        TokenStatus::at(self.expires_at, self.validated_at, now)
    }

    pub fn is_valid(&self, now: Timestamp) -> bool {
        self.status(now).is_valid()
    }
}

/// DTO for issuing a new token.
#[derive(Debug)]
pub struct CreateToken {
    pub token: String,
    pub expires_at: Timestamp,
    pub user_id: DbId,
}
