//! Domain primitives shared by the Book Network crates.
//!
//! Nothing in here touches the database or HTTP: these are the pure rules
//! (authority mapping, token validity, public path matching) that the store
//! and the API layer build on.

pub mod access;
pub mod activation;
pub mod authority;
pub mod error;
pub mod roles;
pub mod types;
pub mod validation;
