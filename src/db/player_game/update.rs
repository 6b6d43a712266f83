use super::PlayerGameRepository;
use crate::config::now_ts;
use crate::errors::AppError;

impl PlayerGameRepository {
    /// Refresh a seat's activity clock (turn polls and action submissions).
    pub async fn touch_last_action(&self, player_game_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE player_games SET last_action_time = $1 WHERE id = $2")
            .bind(now_ts())
            .bind(player_game_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to touch player game: {}", e)))?;

        Ok(())
    }
}
