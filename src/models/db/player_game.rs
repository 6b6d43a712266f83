use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Per-player game row. Exactly `num_players` rows exist per game;
/// `player_id` is the 0-indexed seat. `reward` and `outcome` stay null
/// until the game reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlayerGame {
    pub id: i64,
    pub game_id: i64,
    pub participant_name: String,
    pub player_id: i32,
    pub reward: Option<f64>,
    pub outcome: Option<String>,
    pub last_action_time: Option<f64>,
    pub is_human: bool,
    pub human_ip: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::Draw => "Draw",
        }
    }

    /// Classify one reward against the spread of all rewards in a game:
    /// above the minimum is a win, below the maximum is a loss, and a flat
    /// spread (everyone equal) is a draw for everyone.
    pub fn classify(reward: f64, min_reward: f64, max_reward: f64) -> Outcome {
        if reward > min_reward {
            Outcome::Win
        } else if reward < max_reward {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }

    /// Elo score for this outcome: 1, 0.5, or 0.
    pub fn score(&self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Draw => 0.5,
            Outcome::Loss => 0.0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
