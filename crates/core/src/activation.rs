//! Activation token rules.
//!
//! A token is usable only while the current time is strictly before its
//! expiry and it has never been validated. Validation is one-shot.

use rand::Rng;

use crate::error::AuthError;
use crate::types::Timestamp;

/// Characters an activation code is drawn from.
const CODE_ALPHABET: &[u8] = b"0123456789";

/// Lifecycle position of a token relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    Expired,
    AlreadyValidated,
}

impl TokenStatus {
    /// Evaluate a token's status at `now`.
    ///
    /// A consumed token reports [`TokenStatus::AlreadyValidated`] even when it
    /// has also expired.
    pub fn at(expires_at: Timestamp, validated_at: Option<Timestamp>, now: Timestamp) -> Self {
        if validated_at.is_some() {
            TokenStatus::AlreadyValidated
        } else if now < expires_at {
            TokenStatus::Valid
        } else {
            TokenStatus::Expired
        }
    }

    pub fn is_valid(self) -> bool {
        self == TokenStatus::Valid
    }

    /// Convert a non-valid status into the matching terminal error.
    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            TokenStatus::Valid => Ok(()),
            TokenStatus::Expired => Err(AuthError::TokenExpired),
            TokenStatus::AlreadyValidated => Err(AuthError::TokenAlreadyValidated),
        }
    }
}

/// Generate a numeric activation code of `length` digits from the thread-local CSPRNG.
pub fn generate_activation_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            char::from(CODE_ALPHABET[idx])
        })
        .collect()
}
