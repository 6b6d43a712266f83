use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// One row of rating history. Rows are never mutated; the current rating
/// for a (participant, environment) is the row with the largest
/// `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub id: i64,
    pub participant_name: String,
    pub environment_id: String,
    pub elo: f64,
    pub updated_at: f64,
}
