use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::errors::AppError;

/// Game model mapping to the `games` table.
///
/// `specific_env_id` is the concrete rules variant chosen at session
/// initialization (meta-environments pick one per game). `status` only ever
/// moves `active -> finished | failed`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub id: i64,
    pub environment_id: String,
    pub specific_env_id: Option<String>,
    pub started_at: f64,
    pub status: String,
    pub reason: Option<String>,
}

impl Game {
    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active.as_str()
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Finished,
    Failed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Finished => "finished",
            GameStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(GameStatus::Active),
            "finished" => Ok(GameStatus::Finished),
            "failed" => Ok(GameStatus::Failed),
            other => Err(AppError::InvalidInput(format!(
                "Unknown game status: {}",
                other
            ))),
        }
    }
}
