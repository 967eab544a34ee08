//! Well-known role name constants.
//!
//! These must match the seed data in `20240601000001_create_credential_tables.sql`.

/// Granted to every account at registration.
pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";
