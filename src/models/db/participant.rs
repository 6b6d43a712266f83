use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Participant model mapping to the `participants` table.
///
/// Covers remote agents, the in-process standard agents, and the shared
/// `Humanity` pseudo-participant. The `token` authenticates agent calls and
/// is never exposed after registration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub name: String,
    pub description: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub token: String,
}
