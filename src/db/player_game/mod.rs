use sqlx::PgPool;

/// Per-player game rows (backed by `player_games` table).
pub struct PlayerGameRepository {
    pool: PgPool,
}

impl PlayerGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

mod read;
mod update;
