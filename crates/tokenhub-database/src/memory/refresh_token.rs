//! In-memory refresh token store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use tokenhub_core::error::AppError;
use tokenhub_core::result::AppResult;
use tokenhub_entity::refresh_token::{
    CreateRefreshToken, RefreshToken, RotateRefreshToken, RotatedRecords,
};

use crate::store::RefreshTokenStore;

/// In-memory [`RefreshTokenStore`].
///
/// Rotation holds the write lock across claim and insert, so concurrent
/// rotations of one secret serialize and only the first finds it active.
#[derive(Debug, Clone, Default)]
pub struct MemoryRefreshTokenStore {
    records: Arc<RwLock<HashMap<Uuid, RefreshToken>>>,
}

impl MemoryRefreshTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record a user owns, active or not.
    pub async fn records_for_user(&self, user_id: Uuid) -> Vec<RefreshToken> {
        let mut records: Vec<RefreshToken> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Total number of records held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn insert_record(
    records: &mut HashMap<Uuid, RefreshToken>,
    data: &CreateRefreshToken,
) -> AppResult<RefreshToken> {
    if records.values().any(|r| r.token_hash == data.token_hash) {
        return Err(AppError::database("Duplicate refresh token hash"));
    }
    let record = RefreshToken {
        id: Uuid::new_v4(),
        user_id: data.user_id,
        token_hash: data.token_hash.clone(),
        expires_at: data.expires_at,
        revoked_at: None,
        created_at: Utc::now(),
    };
    records.insert(record.id, record.clone());
    Ok(record)
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn create(&self, data: &CreateRefreshToken) -> AppResult<RefreshToken> {
        let mut records = self.records.write().await;
        insert_record(&mut records, data)
    }

    async fn rotate(&self, step: &RotateRefreshToken) -> AppResult<Option<RotatedRecords>> {
        let mut records = self.records.write().await;

        let Some(claimed) = records
            .values_mut()
            .find(|r| r.token_hash == step.presented_hash && r.is_active_at(step.now))
        else {
            return Ok(None);
        };
        claimed.revoked_at = Some(step.now);
        let revoked = claimed.clone();

        let successor = insert_record(&mut records, &step.successor_of(&revoked))?;
        Ok(Some(RotatedRecords { revoked, successor }))
    }

    async fn revoke_by_hash(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let mut records = self.records.write().await;
        match records
            .values_mut()
            .find(|r| r.token_hash == token_hash && r.revoked_at.is_none())
        {
            Some(record) => {
                record.revoked_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let mut records = self.records.write().await;
        let mut revoked = 0u64;
        for record in records
            .values_mut()
            .filter(|r| r.user_id == user_id && r.is_active_at(now))
        {
            record.revoked_at = Some(now);
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn count_active_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id && r.is_active_at(now))
            .count() as u64)
    }

    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.expires_at >= cutoff && r.revoked_at.is_none_or(|at| at >= cutoff));
        Ok((before - records.len()) as u64)
    }
}
