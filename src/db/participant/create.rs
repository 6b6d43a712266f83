use super::ParticipantRepository;
use crate::errors::AppError;
use crate::models::db::Participant;

impl ParticipantRepository {
    /// Create a new participant.
    ///
    /// # Returns
    /// * `Ok(Participant)` - The stored row, token included
    /// * `Err(AppError::AlreadyExists)` - Name is taken
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        email: &str,
        token: &str,
    ) -> Result<Participant, AppError> {
        if self.exists(name).await? {
            return Err(AppError::AlreadyExists("Model name exists.".into()));
        }

        let participant = sqlx::query_as::<_, Participant>(
            "INSERT INTO participants (name, description, email, token)
            VALUES ($1, $2, $3, $4)
            RETURNING name, description, email, token",
        )
        .bind(name)
        .bind(description)
        .bind(email)
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create participant: {}", e)))?;

        tracing::info!("Registered participant '{}'", participant.name);
        Ok(participant)
    }

    /// Insert a participant only if the name is free. Used by startup
    /// seeding, which must be idempotent across restarts.
    pub async fn create_if_absent(
        &self,
        name: &str,
        description: &str,
        email: &str,
        token: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO participants (name, description, email, token)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .bind(email)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to seed participant: {}", e)))?;

        Ok(())
    }
}
