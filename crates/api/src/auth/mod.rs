//! Authentication and authorization primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation and validation.
//! - [`provider`] -- email + password authentication against a credential source.
//! - [`activation`] -- activation code issuance and consumption.

pub mod activation;
pub mod jwt;
pub mod password;
pub mod provider;
