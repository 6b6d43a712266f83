use super::RatingRepository;
use crate::config::DEFAULT_ELO;
use crate::errors::AppError;
use crate::models::db::Rating;

impl RatingRepository {
    /// Current rating row for a (participant, environment), if any.
    pub async fn latest(
        &self,
        participant_name: &str,
        environment_id: &str,
    ) -> Result<Option<Rating>, AppError> {
        sqlx::query_as::<_, Rating>(
            "SELECT id, participant_name, environment_id, elo, updated_at
            FROM ratings
            WHERE participant_name = $1 AND environment_id = $2
            ORDER BY updated_at DESC
            LIMIT 1",
        )
        .bind(participant_name)
        .bind(environment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query rating: {}", e)))
    }

    /// Current rating value, defaulting for unrated participants.
    pub async fn current_elo(
        &self,
        participant_name: &str,
        environment_id: &str,
    ) -> Result<f64, AppError> {
        Ok(self
            .latest(participant_name, environment_id)
            .await?
            .map(|r| r.elo)
            .unwrap_or(DEFAULT_ELO))
    }

    /// Newest two rating rows (current and previous), newest first.
    pub async fn latest_two(
        &self,
        participant_name: &str,
        environment_id: &str,
    ) -> Result<Vec<Rating>, AppError> {
        sqlx::query_as::<_, Rating>(
            "SELECT id, participant_name, environment_id, elo, updated_at
            FROM ratings
            WHERE participant_name = $1 AND environment_id = $2
            ORDER BY updated_at DESC
            LIMIT 2",
        )
        .bind(participant_name)
        .bind(environment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query ratings: {}", e)))
    }
}
