use sqlx::PgPool;

/// Environment catalog repository (backed by `environments` table).
pub struct EnvironmentRepository {
    pool: PgPool,
}

impl EnvironmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

mod create;
mod read;
