use sqlx::PgPool;

/// Participant repository (backed by `participants` table).
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

mod create;
mod read;
