use super::TurnLogRepository;
use crate::config::now_ts;
use crate::errors::AppError;

impl TurnLogRepository {
    /// Answer a pending turn: fill in the action and its timestamp.
    pub async fn fill_action(&self, turn_log_id: i64, action: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE turn_logs SET action = $1, ts_action = $2 WHERE id = $3")
            .bind(action)
            .bind(now_ts())
            .bind(turn_log_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fill turn action: {}", e)))?;

        Ok(())
    }
}
