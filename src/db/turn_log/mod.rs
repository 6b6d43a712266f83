use sqlx::PgPool;

/// Turn log repository (backed by `turn_logs` table). Append-only except
/// for filling the action half of a pending row.
pub struct TurnLogRepository {
    pool: PgPool,
}

impl TurnLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

mod create;
mod read;
mod update;
