use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Append-only log of observations delivered to a participant and the
/// actions that answered them. A row with `ts_action` null is the pending
/// turn: the one move its participant currently owes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TurnLog {
    pub id: i64,
    pub player_game_id: i64,
    pub participant_name: String,
    pub observation: String,
    pub ts_observation: f64,
    pub action: Option<String>,
    pub ts_action: Option<f64>,
}
