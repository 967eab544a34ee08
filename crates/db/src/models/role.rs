//! Role entity model.

use booknet_core::types::{DbId, Timestamp};
use booknet_core::validation::not_blank;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A role row from the `roles` table.
///
/// The users holding a role are reachable through
/// [`UserRepo::list_by_role`](crate::repositories::UserRepo::list_by_role)
/// and are never embedded in the serialized role.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub last_modified_at: Option<Timestamp>,
}

/// DTO for creating a new role.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRole {
    #[validate(custom(function = "not_blank", message = "Role name is mandatory"))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_role_name_fails_validation() {
        let blank = CreateRole { name: "   ".to_string() };
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let named = CreateRole { name: "LIBRARIAN".to_string() };
        assert!(named.validate().is_ok());
    }
}
