use sqlx::PgPool;

/// Rating history repository (backed by `ratings` table). Strictly
/// append-only; the newest row per (participant, environment) is current.
pub struct RatingRepository {
    pool: PgPool,
}

impl RatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

mod create;
mod read;
