use super::GameRepository;
use crate::errors::AppError;
use crate::models::db::GameStatus;

impl GameRepository {
    /// Record the concrete rules variant chosen at session initialization.
    /// Set once; later calls are no-ops.
    pub async fn set_specific_env_id(
        &self,
        game_id: i64,
        specific_env_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE games SET specific_env_id = $1
            WHERE id = $2 AND specific_env_id IS NULL",
        )
        .bind(specific_env_id)
        .bind(game_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to set specific env: {}", e)))?;

        Ok(())
    }

    /// Move an active game to `failed`. Returns false if the game already
    /// reached a terminal state, so callers never double-terminate.
    pub async fn mark_failed(
        &self,
        game_id: i64,
        reason: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE games SET status = $1, reason = COALESCE($2, reason)
            WHERE id = $3 AND status = $4",
        )
        .bind(GameStatus::Failed.as_str())
        .bind(reason)
        .bind(game_id)
        .bind(GameStatus::Active.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to mark game failed: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
