//! User entity model and DTOs.

use booknet_core::types::{DbId, Timestamp};
use booknet_core::validation::not_blank;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::role::Role;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub firstname: String,
    pub lastname: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Unique; doubles as the login identifier.
    pub email: String,
    pub password_hash: String,
    pub account_locked: bool,
    pub enabled: bool,
    pub created_at: Timestamp,
    /// `None` until the first update.
    pub last_modified_at: Option<Timestamp>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub firstname: String,
    pub lastname: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: String,
    pub account_locked: bool,
    pub enabled: bool,
    /// Names of the roles assigned to the user.
    pub roles: Vec<String>,
    pub created_at: Timestamp,
    pub last_modified_at: Option<Timestamp>,
}

impl UserResponse {
    pub fn new(user: &User, roles: &[Role]) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            full_name: user.full_name(),
            date_of_birth: user.date_of_birth,
            email: user.email.clone(),
            account_locked: user.account_locked,
            enabled: user.enabled,
            roles: roles.iter().map(|r| r.name.clone()).collect(),
            created_at: user.created_at,
            last_modified_at: user.last_modified_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub firstname: String,
    pub lastname: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: String,
    pub password_hash: String,
    pub enabled: bool,
}

/// DTO for a profile update. All fields are optional; present names must not
/// be blank.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(custom(function = "not_blank", message = "Firstname must not be blank"))]
    pub firstname: Option<String>,
    #[validate(custom(function = "not_blank", message = "Lastname must not be blank"))]
    pub lastname: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}
