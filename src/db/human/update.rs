use super::HumanRepository;
use crate::config::now_ts;
use crate::errors::AppError;

impl HumanRepository {
    /// Bump a human's completed-game counter.
    pub async fn increment_games_played(&self, ip_address: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE humans SET games_played = games_played + 1, last_active = $1
            WHERE ip_address = $2",
        )
        .bind(now_ts())
        .bind(ip_address)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update human: {}", e)))?;

        Ok(())
    }
}
