//! Repository for the `tokens` table.

use booknet_core::types::DbId;
use sqlx::PgPool;

use crate::models::token::{CreateToken, Token};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token, created_at, expires_at, validated_at, user_id";

/// Provides CRUD operations for activation tokens.
pub struct TokenRepo;

impl TokenRepo {
    /// Insert a new token, returning the created row.
    ///
    /// Fails with a `uq_tokens_token` unique violation if the value collides.
    pub async fn create(pool: &PgPool, input: &CreateToken) -> Result<Token, sqlx::Error> {
        let query = format!(
            "INSERT INTO tokens (token, expires_at, user_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Token>(&query)
            .bind(&input.token)
            .bind(input.expires_at)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    /// Find a token by its value, regardless of status.
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Token>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tokens WHERE token = $1");
        sqlx::query_as::<_, Token>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// List a user's tokens, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Token>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tokens WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Token>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Mark a token validated and enable its owner, atomically.
    ///
    /// The update only applies while the token is still unvalidated and
    /// unexpired, so concurrent attempts cannot both succeed. Returns `false`
    /// when the token was no longer valid.
    pub async fn validate_and_enable_owner(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owner: Option<(DbId,)> = sqlx::query_as(
            "UPDATE tokens SET validated_at = NOW()
             WHERE id = $1 AND validated_at IS NULL AND expires_at > NOW()
             RETURNING user_id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((user_id,)) = owner else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query("UPDATE users SET enabled = true, last_modified_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete tokens that can never be presented usefully again. Returns the
    /// count of deleted rows.
    ///
    /// Validated tokens always go. Expired tokens go once their owner is
    /// enabled or a newer token exists for the same owner. The newest token of
    /// a disabled account is kept even when expired, so presenting it can
    /// still trigger a replacement.
    pub async fn delete_stale(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM tokens t
             WHERE t.validated_at IS NOT NULL
                OR (t.expires_at < NOW()
                    AND (EXISTS (SELECT 1 FROM users u WHERE u.id = t.user_id AND u.enabled)
                         OR EXISTS (SELECT 1 FROM tokens n
                                    WHERE n.user_id = t.user_id AND n.id > t.id)))",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
