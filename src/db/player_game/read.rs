use super::PlayerGameRepository;
use crate::errors::AppError;
use crate::models::db::PlayerGame;

impl PlayerGameRepository {
    /// All seats of a game, in seat order.
    pub async fn for_game(&self, game_id: i64) -> Result<Vec<PlayerGame>, AppError> {
        sqlx::query_as::<_, PlayerGame>(
            "SELECT id, game_id, participant_name, player_id, reward, outcome,
                    last_action_time, is_human, human_ip
            FROM player_games
            WHERE game_id = $1
            ORDER BY player_id",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list player games: {}", e)))
    }

    pub async fn find_by_id(&self, player_game_id: i64) -> Result<PlayerGame, AppError> {
        sqlx::query_as::<_, PlayerGame>(
            "SELECT id, game_id, participant_name, player_id, reward, outcome,
                    last_action_time, is_human, human_ip
            FROM player_games
            WHERE id = $1",
        )
        .bind(player_game_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query player game: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Player record not found.".into()))
    }

    /// Seats in active games that never received an observation and have
    /// been idle past the cutoff. Sweeper input for the load-stall pass.
    pub async fn stalled_seats(&self, cutoff_ts: f64) -> Result<Vec<PlayerGame>, AppError> {
        sqlx::query_as::<_, PlayerGame>(
            "SELECT pg.id, pg.game_id, pg.participant_name, pg.player_id, pg.reward,
                    pg.outcome, pg.last_action_time, pg.is_human, pg.human_ip
            FROM player_games pg
            JOIN games g ON g.id = pg.game_id
            WHERE g.status = 'active'
              AND pg.outcome IS NULL
              AND pg.last_action_time < $1
              AND NOT EXISTS (SELECT 1 FROM turn_logs WHERE player_game_id = pg.id)",
        )
        .bind(cutoff_ts)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list stalled seats: {}", e)))
    }

    /// A participant's seat in a game.
    pub async fn find(
        &self,
        game_id: i64,
        participant_name: &str,
    ) -> Result<Option<PlayerGame>, AppError> {
        sqlx::query_as::<_, PlayerGame>(
            "SELECT id, game_id, participant_name, player_id, reward, outcome,
                    last_action_time, is_human, human_ip
            FROM player_games
            WHERE game_id = $1 AND participant_name = $2",
        )
        .bind(game_id)
        .bind(participant_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query player game: {}", e)))
    }

    /// A human's seat in a game, keyed by source IP.
    pub async fn find_by_human_ip(
        &self,
        game_id: i64,
        human_ip: &str,
    ) -> Result<Option<PlayerGame>, AppError> {
        sqlx::query_as::<_, PlayerGame>(
            "SELECT id, game_id, participant_name, player_id, reward, outcome,
                    last_action_time, is_human, human_ip
            FROM player_games
            WHERE game_id = $1 AND human_ip = $2",
        )
        .bind(game_id)
        .bind(human_ip)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query human seat: {}", e)))
    }

    /// A seat by game and seat number.
    pub async fn find_by_seat(
        &self,
        game_id: i64,
        player_id: i32,
    ) -> Result<Option<PlayerGame>, AppError> {
        sqlx::query_as::<_, PlayerGame>(
            "SELECT id, game_id, participant_name, player_id, reward, outcome,
                    last_action_time, is_human, human_ip
            FROM player_games
            WHERE game_id = $1 AND player_id = $2",
        )
        .bind(game_id)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query seat: {}", e)))
    }

    /// Every game a human has played, newest first. Stats input.
    pub async fn history_for_human(&self, human_ip: &str) -> Result<Vec<PlayerGame>, AppError> {
        sqlx::query_as::<_, PlayerGame>(
            "SELECT id, game_id, participant_name, player_id, reward, outcome,
                    last_action_time, is_human, human_ip
            FROM player_games
            WHERE is_human AND human_ip = $1
            ORDER BY game_id DESC",
        )
        .bind(human_ip)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list human history: {}", e)))
    }

}
