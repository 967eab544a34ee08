//! Book network credential service library.
//!
//! Exposes the building blocks (config, state, authentication, request gate,
//! routes) so integration tests and the binary entrypoint share them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
