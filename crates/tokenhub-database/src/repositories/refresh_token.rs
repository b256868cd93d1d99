//! Refresh token repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tokenhub_core::error::{AppError, ErrorKind};
use tokenhub_core::result::AppResult;
use tokenhub_entity::refresh_token::{
    CreateRefreshToken, RefreshToken, RotateRefreshToken, RotatedRecords,
};

use crate::store::RefreshTokenStore;

const INSERT_SQL: &str = "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at) \
                          VALUES ($1, $2, $3, $4) RETURNING *";

/// Repository for refresh token records.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for RefreshTokenRepository {
    async fn create(&self, data: &CreateRefreshToken) -> AppResult<RefreshToken> {
        sqlx::query_as::<_, RefreshToken>(INSERT_SQL)
            .bind(Uuid::new_v4())
            .bind(data.user_id)
            .bind(&data.token_hash)
            .bind(data.expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to create refresh token", e)
            })
    }

    async fn rotate(&self, step: &RotateRefreshToken) -> AppResult<Option<RotatedRecords>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin rotation", e)
        })?;

        // The conditional UPDATE takes the row lock. A concurrent rotation of
        // the same record blocks here, then re-checks `revoked_at IS NULL`
        // against the committed row and matches nothing.
        let claimed = sqlx::query_as::<_, RefreshToken>(
            "UPDATE refresh_tokens SET revoked_at = $2 \
             WHERE token_hash = $1 AND revoked_at IS NULL AND expires_at > $2 \
             RETURNING *",
        )
        .bind(&step.presented_hash)
        .bind(step.now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to claim refresh token", e)
        })?;

        let Some(revoked) = claimed else {
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to end rotation", e)
            })?;
            return Ok(None);
        };

        let successor_data = step.successor_of(&revoked);
        let successor = sqlx::query_as::<_, RefreshToken>(INSERT_SQL)
            .bind(Uuid::new_v4())
            .bind(successor_data.user_id)
            .bind(&successor_data.token_hash)
            .bind(successor_data.expires_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to create successor token", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit rotation", e)
        })?;

        Ok(Some(RotatedRecords { revoked, successor }))
    }

    async fn revoke_by_hash(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2 \
             WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke refresh token", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2 \
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > $2",
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke user refresh tokens", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn count_active_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM refresh_tokens \
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > $2",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count refresh tokens", e)
        })?;
        Ok(count.max(0) as u64)
    }

    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE expires_at < $1 OR revoked_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to purge refresh tokens", e)
        })?;
        Ok(result.rows_affected())
    }
}
