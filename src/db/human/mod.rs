use sqlx::PgPool;

/// Human player repository (backed by `humans` table).
pub struct HumanRepository {
    pool: PgPool,
}

impl HumanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

mod create;
mod read;
mod update;
