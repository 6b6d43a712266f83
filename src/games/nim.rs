// Nim
//
// Game rules:
// - A shared pile starts with a random number of stones
// - Players alternate removing 1-3 stones with an action like "[take 2]"
// - Whoever removes the last stone wins
// - An unparseable or illegal move loses immediately

use std::collections::HashMap;

use rand::Rng;

use crate::config::GAME_SENDER_ID;
use crate::games::{GameRules, Observation, Rewards, RulesError, StepInfo};

pub const NIM_ENV_ID: &str = "Nim-v0";
pub const NUM_PLAYERS: usize = 2;

const MIN_STARTING_STONES: u32 = 10;
const MAX_STARTING_STONES: u32 = 21;
const MAX_TAKE: u32 = 3;

pub struct NimRules {
    pile: u32,
    current: i32,
    done: bool,
    rewards: Option<Rewards>,
    reason: Option<String>,
    /// Messages each player has not yet acted on.
    inbox: [Observation; NUM_PLAYERS],
    /// Everything ever addressed to each player.
    transcript: [Observation; NUM_PLAYERS],
}

pub fn create_nim() -> Box<dyn GameRules> {
    Box::new(NimRules::new())
}

/// Only moves that are legal for the current pile get advertised.
fn available_moves(pile: u32) -> String {
    (1..=MAX_TAKE.min(pile))
        .map(|n| format!("[take {}]", n))
        .collect::<Vec<_>>()
        .join(", ")
}

impl NimRules {
    pub fn new() -> Self {
        let pile = rand::rng().random_range(MIN_STARTING_STONES..=MAX_STARTING_STONES);
        Self::with_pile(pile)
    }

    /// Fixed starting pile, used by tests for deterministic games.
    pub fn with_pile(pile: u32) -> Self {
        let mut game = Self {
            pile,
            current: 0,
            done: false,
            rewards: None,
            reason: None,
            inbox: [Vec::new(), Vec::new()],
            transcript: [Vec::new(), Vec::new()],
        };

        let moves = available_moves(pile);
        for pid in 0..NUM_PLAYERS as i32 {
            game.send_to(
                pid,
                format!(
                    "Welcome to Nim. The pile holds {} stones. On your turn remove \
                     1 to {} stones; whoever takes the last stone wins. \
                     Available moves: {}",
                    pile, MAX_TAKE, moves
                ),
            );
        }
        game.send_to(0, "You go first.".to_string());
        game
    }

    fn send_to(&mut self, player_id: i32, text: String) {
        let message = (GAME_SENDER_ID, text);
        self.inbox[player_id as usize].push(message.clone());
        self.transcript[player_id as usize].push(message);
    }

    fn broadcast(&mut self, text: String) {
        for pid in 0..NUM_PLAYERS as i32 {
            self.send_to(pid, text.clone());
        }
    }

    fn finish(&mut self, winner: i32, reason: String) {
        let loser = 1 - winner;
        let mut rewards = HashMap::new();
        rewards.insert(winner, 1.0);
        rewards.insert(loser, -1.0);
        self.rewards = Some(rewards);
        self.reason = Some(reason.clone());
        self.done = true;
        self.broadcast(reason);
    }

    /// Parse `[take N]` out of a free-form action string.
    fn parse_take(action: &str) -> Option<u32> {
        let lowered = action.to_lowercase();
        let start = lowered.find("[take")?;
        let rest = &lowered[start + "[take".len()..];
        let end = rest.find(']')?;
        rest[..end].trim().parse().ok()
    }
}

impl Default for NimRules {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules for NimRules {
    fn specific_env_id(&self) -> &str {
        NIM_ENV_ID
    }

    fn current_player(&self) -> i32 {
        self.current
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn observation(&self, player_id: i32) -> Result<Observation, RulesError> {
        self.inbox
            .get(player_id as usize)
            .cloned()
            .ok_or(RulesError::UnknownPlayer(player_id))
    }

    fn force_observation(&self, player_id: i32) -> Observation {
        self.transcript
            .get(player_id as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn step(&mut self, action: &str) -> Result<(bool, StepInfo), RulesError> {
        if self.done {
            return Ok((
                true,
                StepInfo {
                    reason: self.reason.clone(),
                },
            ));
        }

        let actor = self.current;
        // The actor has seen everything up to their move.
        self.inbox[actor as usize].clear();

        let take = Self::parse_take(action).filter(|&n| (1..=MAX_TAKE).contains(&n));
        let take = match take {
            Some(n) if n <= self.pile => n,
            _ => {
                self.finish(
                    1 - actor,
                    format!("Player {} made an invalid move.", actor),
                );
                return Ok((
                    true,
                    StepInfo {
                        reason: self.reason.clone(),
                    },
                ));
            }
        };

        self.pile -= take;
        self.broadcast(format!(
            "Player {} took {} stone(s). {} remain.",
            actor, take, self.pile
        ));

        if self.pile == 0 {
            self.finish(actor, format!("Player {} took the last stone.", actor));
            return Ok((
                true,
                StepInfo {
                    reason: self.reason.clone(),
                },
            ));
        }

        self.current = 1 - actor;
        let prompt = format!(
            "Your turn ({} stones left). Available moves: {}",
            self.pile,
            available_moves(self.pile)
        );
        self.send_to(self.current, prompt);
        Ok((false, StepInfo::default()))
    }

    fn close(&mut self) -> Result<Rewards, RulesError> {
        self.rewards.clone().ok_or(RulesError::NotFinished)
    }
}
