use super::HumanRepository;
use crate::config::now_ts;
use crate::errors::AppError;
use crate::models::db::Human;

impl HumanRepository {
    /// Create a human record for an IP, or refresh `last_active` on the
    /// existing one. Registration is called on every site visit.
    pub async fn create_or_refresh(&self, ip_address: &str) -> Result<Human, AppError> {
        let now = now_ts();
        sqlx::query_as::<_, Human>(
            "INSERT INTO humans (ip_address, created_at, last_active)
            VALUES ($1, $2, $2)
            ON CONFLICT (ip_address)
            DO UPDATE SET last_active = EXCLUDED.last_active
            RETURNING id, ip_address, games_played, created_at, last_active",
        )
        .bind(ip_address)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to register human: {}", e)))
    }
}
