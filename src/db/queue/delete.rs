use super::QueueRepository;
use crate::errors::AppError;

impl QueueRepository {
    pub async fn delete_by_id(&self, entry_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM queue_entries WHERE id = $1")
            .bind(entry_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete queue entry: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    /// Dequeue a non-human participant from an environment.
    pub async fn delete_agent_entry(
        &self,
        environment_id: &str,
        participant_name: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM queue_entries
            WHERE environment_id = $1 AND participant_name = $2 AND NOT is_human",
        )
        .bind(environment_id)
        .bind(participant_name)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete queue entry: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
