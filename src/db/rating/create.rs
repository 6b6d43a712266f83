use super::RatingRepository;
use crate::config::now_ts;
use crate::errors::AppError;
use crate::models::db::Rating;

impl RatingRepository {
    /// Append a new rating row. History is never rewritten.
    pub async fn append(
        &self,
        participant_name: &str,
        environment_id: &str,
        elo: f64,
    ) -> Result<Rating, AppError> {
        sqlx::query_as::<_, Rating>(
            "INSERT INTO ratings (participant_name, environment_id, elo, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, participant_name, environment_id, elo, updated_at",
        )
        .bind(participant_name)
        .bind(environment_id)
        .bind(elo)
        .bind(now_ts())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to append rating: {}", e)))
    }
}
