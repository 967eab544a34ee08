//! Repository for the `users` table.

use booknet_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateProfile, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, firstname, lastname, date_of_birth, email, password_hash, \
                       account_locked, enabled, created_at, last_modified_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// Fails with a `uq_users_email` unique violation if the email is taken.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&insert_query())
            .bind(&input.firstname)
            .bind(&input.lastname)
            .bind(input.date_of_birth)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.enabled)
            .fetch_one(pool)
            .await
    }

    /// Insert a new user and link the named roles in one transaction.
    ///
    /// Role names that do not exist are skipped.
    pub async fn create_with_roles(
        pool: &PgPool,
        input: &CreateUser,
        role_names: &[&str],
    ) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&insert_query())
            .bind(&input.firstname)
            .bind(&input.lastname)
            .bind(input.date_of_birth)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.enabled)
            .fetch_one(&mut *tx)
            .await?;

        let names: Vec<String> = role_names.iter().map(|n| n.to_string()).collect();
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id)
             SELECT $1, id FROM roles WHERE name = ANY($2)",
        )
        .bind(user.id)
        .bind(&names)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List the users holding a role, ordered by ID ascending.
    pub async fn list_by_role(pool: &PgPool, role_id: DbId) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {cols} FROM users u
             JOIN user_roles ur ON ur.user_id = u.id
             WHERE ur.role_id = $1
             ORDER BY u.id ASC",
            cols = prefixed_columns("u")
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role_id)
            .fetch_all(pool)
            .await
    }

    /// Update profile fields. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                firstname = COALESCE($2, firstname),
                lastname = COALESCE($3, lastname),
                date_of_birth = COALESCE($4, date_of_birth),
                last_modified_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.firstname)
            .bind(&input.lastname)
            .bind(input.date_of_birth)
            .fetch_optional(pool)
            .await
    }

    /// Set the `account_locked` flag. Returns `None` if the user does not exist.
    pub async fn set_locked(
        pool: &PgPool,
        id: DbId,
        locked: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET account_locked = $2, last_modified_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(locked)
            .fetch_optional(pool)
            .await
    }

}

fn insert_query() -> String {
    format!(
        "INSERT INTO users (firstname, lastname, date_of_birth, email, password_hash, enabled)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}"
    )
}

fn prefixed_columns(alias: &str) -> String {
    COLUMNS
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
