use super::GameRepository;
use crate::config::{RECENCY_WINDOW, now_ts};
use crate::errors::AppError;
use crate::models::db::{Game, GameStatus};

impl GameRepository {
    /// Find a game by ID.
    ///
    /// # Returns
    /// * `Ok(Game)` - Game data
    /// * `Err(AppError::NotFound)` - Game doesn't exist
    pub async fn find_by_id(&self, game_id: i64) -> Result<Game, AppError> {
        sqlx::query_as::<_, Game>(
            "SELECT id, environment_id, specific_env_id, started_at, status, reason
            FROM games
            WHERE id = $1",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query game: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Game not found.".into()))
    }

    /// The active game a participant is playing in the given environment,
    /// if any. Enforces the queue/game exclusivity invariant and answers
    /// matchmaking-status polls.
    pub async fn active_game_for_participant(
        &self,
        environment_id: &str,
        participant_name: &str,
    ) -> Result<Option<Game>, AppError> {
        sqlx::query_as::<_, Game>(
            "SELECT g.id, g.environment_id, g.specific_env_id, g.started_at, g.status, g.reason
            FROM games g
            JOIN player_games pg ON pg.game_id = g.id
            WHERE pg.participant_name = $1
              AND g.environment_id = $2
              AND g.status = $3
            ORDER BY g.id DESC
            LIMIT 1",
        )
        .bind(participant_name)
        .bind(environment_id)
        .bind(GameStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query active game: {}", e)))
    }

    /// The active game a human (keyed by IP) is playing, if any.
    pub async fn active_game_for_human(&self, human_ip: &str) -> Result<Option<Game>, AppError> {
        sqlx::query_as::<_, Game>(
            "SELECT g.id, g.environment_id, g.specific_env_id, g.started_at, g.status, g.reason
            FROM games g
            JOIN player_games pg ON pg.game_id = g.id
            WHERE pg.human_ip = $1 AND g.status = $2
            ORDER BY g.id DESC
            LIMIT 1",
        )
        .bind(human_ip)
        .bind(GameStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query human game: {}", e)))
    }

    /// Distinct games within the recency window in which both participants
    /// appear. Feeds the matchmaker's rematch penalty.
    pub async fn recent_meetings(&self, name_a: &str, name_b: &str) -> Result<i64, AppError> {
        let since = now_ts() - RECENCY_WINDOW;
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM games g
            WHERE g.started_at >= $1
              AND EXISTS (SELECT 1 FROM player_games
                          WHERE game_id = g.id AND participant_name = $2)
              AND EXISTS (SELECT 1 FROM player_games
                          WHERE game_id = g.id AND participant_name = $3)",
        )
        .bind(since)
        .bind(name_a)
        .bind(name_b)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to count recent meetings: {}", e)))
    }
}
