use super::EnvironmentRepository;
use crate::errors::AppError;

impl EnvironmentRepository {
    /// Register an environment. Idempotent so startup seeding can run on
    /// every boot.
    pub async fn register(&self, environment_id: &str, num_players: i32) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO environments (environment_id, num_players)
            VALUES ($1, $2)
            ON CONFLICT (environment_id) DO NOTHING",
        )
        .bind(environment_id)
        .bind(num_players)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to register environment: {}", e)))?;

        Ok(())
    }
}
