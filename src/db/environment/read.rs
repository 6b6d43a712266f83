use super::EnvironmentRepository;
use crate::errors::AppError;
use crate::models::db::Environment;

impl EnvironmentRepository {
    pub async fn find_by_id(&self, environment_id: &str) -> Result<Environment, AppError> {
        sqlx::query_as::<_, Environment>(
            "SELECT environment_id, num_players FROM environments WHERE environment_id = $1",
        )
        .bind(environment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query environment: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Invalid environment ID.".into()))
    }

    pub async fn all(&self) -> Result<Vec<Environment>, AppError> {
        sqlx::query_as::<_, Environment>(
            "SELECT environment_id, num_players FROM environments ORDER BY environment_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list environments: {}", e)))
    }
}
