use super::HumanRepository;
use crate::errors::AppError;
use crate::models::db::Human;

impl HumanRepository {
    pub async fn find_by_ip(&self, ip_address: &str) -> Result<Option<Human>, AppError> {
        sqlx::query_as::<_, Human>(
            "SELECT id, ip_address, games_played, created_at, last_active
            FROM humans
            WHERE ip_address = $1",
        )
        .bind(ip_address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to query human: {}", e)))
    }
}
