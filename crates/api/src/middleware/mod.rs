//! Request gate and authorization extractors.
//!
//! - [`gate::request_gate`] -- Lets public paths through and establishes identity
//!   from a JWT Bearer token for everything else.
//! - [`auth::AuthUser`] -- Extracts the identity the gate attached to the request.
//! - [`rbac::RequireAdmin`] -- Requires the `ADMIN` authority.

pub mod auth;
pub mod gate;
pub mod rbac;
