use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Environment catalog entry: a rules configuration and the number of
/// players a single game of it needs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Environment {
    pub environment_id: String,
    pub num_players: i32,
}
