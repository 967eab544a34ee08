//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod role_repo;
pub mod token_repo;
pub mod user_repo;

pub use role_repo::RoleRepo;
pub use token_repo::TokenRepo;
pub use user_repo::UserRepo;
