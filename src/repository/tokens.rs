//! Refresh tokens repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::token::RefreshToken};

#[derive(Clone)]
pub struct TokensRepository {
    pool: Pool<Postgres>,
}

impl TokensRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store a freshly generated refresh token for a user.
    ///
    /// Revokes every outstanding token for the same user and inserts the new
    /// row inside one transaction, so two concurrent issuances cannot leave
    /// two simultaneously valid tokens.
    pub async fn issue(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<RefreshToken> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE refresh_tokens SET is_revoked = TRUE WHERE user_id = $1 AND NOT is_revoked")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at, is_revoked, created_at)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row)
    }

    /// Find a non-revoked token row by its exact string
    pub async fn find_active(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens WHERE token = $1 AND NOT is_revoked",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Revoke a single token; returns whether a row was found
    pub async fn revoke(&self, token: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE refresh_tokens SET is_revoked = TRUE WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revoke every outstanding token for a user; idempotent
    pub async fn revoke_all_for_user(&self, user_id: i32) -> AppResult<()> {
        sqlx::query("UPDATE refresh_tokens SET is_revoked = TRUE WHERE user_id = $1 AND NOT is_revoked")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
