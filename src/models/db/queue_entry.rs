use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Matchmaking queue row. At most one per (participant, environment),
/// except `Humanity` entries which are keyed by `human_ip`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueueEntry {
    pub id: i64,
    pub environment_id: String,
    pub participant_name: String,
    pub is_human: bool,
    pub human_ip: Option<String>,
    pub joined_at: f64,
    pub time_limit: f64,
    pub last_checked: f64,
}
