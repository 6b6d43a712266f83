use sqlx::PgPool;

/// Matchmaking queue repository (backed by `queue_entries` table).
pub struct QueueRepository {
    pool: PgPool,
}

impl QueueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

mod create;
mod delete;
mod read;
mod update;
