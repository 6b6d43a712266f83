use super::QueueRepository;
use crate::config::now_ts;
use crate::errors::AppError;

impl QueueRepository {
    /// Refresh the inactivity clock for a queue entry. Concurrent polls
    /// collapse to the last writer, which is all the sweeper needs.
    pub async fn touch_last_checked(&self, entry_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE queue_entries SET last_checked = $1 WHERE id = $2")
            .bind(now_ts())
            .bind(entry_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to touch queue entry: {}", e)))?;

        Ok(())
    }
}
