use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{IndexQueueStore, StorageError};

use super::SqliteRepository;

#[async_trait]
impl IndexQueueStore for SqliteRepository {
    async fn load_queue(&self, key: &str) -> Result<Option<Vec<usize>>, StorageError> {
        let row = sqlx::query("SELECT indices FROM pool_queues WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row
            .try_get("indices")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StorageError::Serialization(format!("queue {key:?}: {err}")))
    }

    async fn save_queue(&self, key: &str, indices: &[usize]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(indices)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO pool_queues (key, indices, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                indices = excluded.indices,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(raw)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_queue(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM pool_queues WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
