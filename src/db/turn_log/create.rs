use super::TurnLogRepository;
use crate::config::now_ts;
use crate::errors::AppError;
use crate::models::db::TurnLog;

impl TurnLogRepository {
    /// Record an observation that now awaits an action (the pending turn).
    pub async fn create_pending(
        &self,
        player_game_id: i64,
        participant_name: &str,
        observation: &str,
    ) -> Result<TurnLog, AppError> {
        sqlx::query_as::<_, TurnLog>(
            "INSERT INTO turn_logs
                (player_game_id, participant_name, observation, ts_observation)
            VALUES ($1, $2, $3, $4)
            RETURNING id, player_game_id, participant_name, observation,
                      ts_observation, action, ts_action",
        )
        .bind(player_game_id)
        .bind(participant_name)
        .bind(observation)
        .bind(now_ts())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create turn log: {}", e)))
    }

    /// Record a turn that was observed and answered in one go (local
    /// sessions move without a poll cycle).
    pub async fn create_complete(
        &self,
        player_game_id: i64,
        participant_name: &str,
        observation: &str,
        ts_observation: f64,
        action: &str,
        ts_action: f64,
    ) -> Result<TurnLog, AppError> {
        sqlx::query_as::<_, TurnLog>(
            "INSERT INTO turn_logs
                (player_game_id, participant_name, observation, ts_observation,
                 action, ts_action)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, player_game_id, participant_name, observation,
                      ts_observation, action, ts_action",
        )
        .bind(player_game_id)
        .bind(participant_name)
        .bind(observation)
        .bind(ts_observation)
        .bind(action)
        .bind(ts_action)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create turn log: {}", e)))
    }
}
