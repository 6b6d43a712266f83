use super::TurnLogRepository;
use crate::errors::AppError;
use crate::models::db::TurnLog;

impl TurnLogRepository {
    /// The pending turn for a seat: newest row whose action is unfilled.
    pub async fn pending_for_player_game(
        &self,
        player_game_id: i64,
    ) -> Result<Option<TurnLog>, AppError> {
        sqlx::query_as::<_, TurnLog>(
            "SELECT id, player_game_id, participant_name, observation,
                    ts_observation, action, ts_action
            FROM turn_logs
            WHERE player_game_id = $1 AND ts_action IS NULL
            ORDER BY ts_observation DESC
            LIMIT 1",
        )
        .bind(player_game_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query pending turn: {}", e)))
    }

    /// Pending turns across all active games whose observation is older
    /// than the cutoff. Sweeper input for the forfeit pass.
    pub async fn expired_pending(&self, cutoff_ts: f64) -> Result<Vec<TurnLog>, AppError> {
        sqlx::query_as::<_, TurnLog>(
            "SELECT tl.id, tl.player_game_id, tl.participant_name, tl.observation,
                    tl.ts_observation, tl.action, tl.ts_action
            FROM turn_logs tl
            JOIN player_games pg ON pg.id = tl.player_game_id
            JOIN games g ON g.id = pg.game_id
            WHERE g.status = 'active'
              AND tl.ts_action IS NULL
              AND tl.ts_observation < $1
            ORDER BY tl.ts_observation ASC",
        )
        .bind(cutoff_ts)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query expired turns: {}", e)))
    }
}
