//! Repository for the `roles` table and the `user_roles` link table.

use booknet_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{CreateRole, Role};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, last_modified_at";

/// Same columns qualified with the `r` alias for join queries.
const JOINED_COLUMNS: &str = "r.id, r.name, r.created_at, r.last_modified_at";

/// Provides CRUD operations for roles and user role assignment.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a new role, returning the created row.
    ///
    /// Fails with a `uq_roles_name` unique violation if the name is taken.
    pub async fn create(pool: &PgPool, input: &CreateRole) -> Result<Role, sqlx::Error> {
        let query = format!("INSERT INTO roles (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a role by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Find every role whose name appears in `names`. Unknown names are ignored.
    pub async fn find_by_names(pool: &PgPool, names: &[String]) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = ANY($1) ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query)
            .bind(names)
            .fetch_all(pool)
            .await
    }

    /// List all roles ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// List the roles assigned to a user, ordered by ID ascending.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM roles r
             JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
             ORDER BY r.id ASC"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Replace a user's role set in one transaction and bump the user's
    /// `last_modified_at`.
    ///
    /// Returns `false` (and changes nothing) if the user does not exist.
    pub async fn replace_for_user(
        pool: &PgPool,
        user_id: DbId,
        role_ids: &[DbId],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let touched = sqlx::query("UPDATE users SET last_modified_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(user_id, role_count = role_ids.len(), "Replaced user roles");
        Ok(true)
    }
}
