use super::QueueRepository;
use crate::config::now_ts;
use crate::errors::AppError;
use crate::models::db::QueueEntry;

impl QueueRepository {
    /// Enqueue an agent participant for an environment.
    ///
    /// # Returns
    /// * `Ok(QueueEntry)` - The stored entry
    /// * `Err(AppError::AlreadyExists)` - Participant already queued here
    pub async fn enqueue_agent(
        &self,
        environment_id: &str,
        participant_name: &str,
        time_limit: f64,
    ) -> Result<QueueEntry, AppError> {
        let now = now_ts();
        self.insert(environment_id, participant_name, false, None, time_limit, now)
            .await
    }

    /// Enqueue the shared human pseudo-participant, keyed by source IP.
    pub async fn enqueue_human(
        &self,
        environment_id: &str,
        participant_name: &str,
        human_ip: &str,
        time_limit: f64,
    ) -> Result<QueueEntry, AppError> {
        let now = now_ts();
        self.insert(
            environment_id,
            participant_name,
            true,
            Some(human_ip),
            time_limit,
            now,
        )
        .await
    }

    async fn insert(
        &self,
        environment_id: &str,
        participant_name: &str,
        is_human: bool,
        human_ip: Option<&str>,
        time_limit: f64,
        now: f64,
    ) -> Result<QueueEntry, AppError> {
        sqlx::query_as::<_, QueueEntry>(
            "INSERT INTO queue_entries
                (environment_id, participant_name, is_human, human_ip,
                 joined_at, time_limit, last_checked)
            VALUES ($1, $2, $3, $4, $5, $6, $5)
            RETURNING id, environment_id, participant_name, is_human, human_ip,
                      joined_at, time_limit, last_checked",
        )
        .bind(environment_id)
        .bind(participant_name)
        .bind(is_human)
        .bind(human_ip)
        .bind(now)
        .bind(time_limit)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::AlreadyExists("Already in matchmaking queue.".into())
            }
            _ => AppError::DatabaseError(format!("Failed to enqueue participant: {}", e)),
        })
    }
}
