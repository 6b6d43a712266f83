use sqlx::PgPool;

/// Game repository (backed by `games` table).
pub struct GameRepository {
    pool: PgPool,
}

impl GameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

mod read;
mod update;
