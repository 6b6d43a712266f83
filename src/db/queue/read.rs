use super::QueueRepository;
use crate::errors::AppError;
use crate::models::db::QueueEntry;

const COLUMNS: &str = "id, environment_id, participant_name, is_human, human_ip, \
                       joined_at, time_limit, last_checked";

impl QueueRepository {
    /// Queue entry for a non-human participant in an environment.
    pub async fn find_agent_entry(
        &self,
        environment_id: &str,
        participant_name: &str,
    ) -> Result<Option<QueueEntry>, AppError> {
        sqlx::query_as::<_, QueueEntry>(&format!(
            "SELECT {COLUMNS} FROM queue_entries
            WHERE environment_id = $1 AND participant_name = $2 AND NOT is_human",
        ))
        .bind(environment_id)
        .bind(participant_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query queue entry: {}", e)))
    }

    /// Queue entry for a human, keyed by source IP (any environment).
    pub async fn find_human_entry(&self, human_ip: &str) -> Result<Option<QueueEntry>, AppError> {
        sqlx::query_as::<_, QueueEntry>(&format!(
            "SELECT {COLUMNS} FROM queue_entries WHERE is_human AND human_ip = $1",
        ))
        .bind(human_ip)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query human queue entry: {}", e)))
    }

    /// All entries waiting in an environment, oldest first.
    pub async fn list_for_environment(
        &self,
        environment_id: &str,
    ) -> Result<Vec<QueueEntry>, AppError> {
        sqlx::query_as::<_, QueueEntry>(&format!(
            "SELECT {COLUMNS} FROM queue_entries
            WHERE environment_id = $1
            ORDER BY joined_at ASC",
        ))
        .bind(environment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list queue: {}", e)))
    }

    /// Every queued entry across environments (sweeper input).
    pub async fn list_all(&self) -> Result<Vec<QueueEntry>, AppError> {
        sqlx::query_as::<_, QueueEntry>(&format!(
            "SELECT {COLUMNS} FROM queue_entries ORDER BY joined_at ASC",
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list queue: {}", e)))
    }
}
