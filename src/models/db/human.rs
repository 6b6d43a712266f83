use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Human user identified by source address.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Human {
    pub id: i64,
    pub ip_address: String,
    pub games_played: i32,
    pub created_at: f64,
    pub last_active: f64,
}
