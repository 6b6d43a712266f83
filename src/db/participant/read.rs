use super::ParticipantRepository;
use crate::errors::AppError;
use crate::models::db::Participant;

impl ParticipantRepository {
    /// Look up a participant by name.
    pub async fn find_by_name(&self, name: &str) -> Result<Participant, AppError> {
        sqlx::query_as::<_, Participant>(
            "SELECT name, description, email, token FROM participants WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query participant: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Participant not found.".into()))
    }

    /// Look up a participant by (name, token). The credential check for all
    /// authenticated agent calls; a miss is indistinguishable from an
    /// unknown name.
    pub async fn find_by_credentials(
        &self,
        name: &str,
        token: &str,
    ) -> Result<Participant, AppError> {
        sqlx::query_as::<_, Participant>(
            "SELECT name, description, email, token
            FROM participants
            WHERE name = $1 AND token = $2",
        )
        .bind(name)
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query participant: {}", e)))?
        .ok_or_else(|| AppError::AuthFailure("Invalid model token or name.".into()))
    }

    pub async fn exists(&self, name: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM participants WHERE name = $1)",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to check participant existence: {}", e))
        })?;

        Ok(exists)
    }
}
