// Game rules infrastructure.
//
// A `GameRules` value is the authoritative state machine for one running
// game. The server never inspects game-specific state; it only drives the
// capability surface below and persists what comes back.

use std::collections::HashMap;

pub mod error;
pub mod nim;
pub mod registry;

pub use error::RulesError;
pub use registry::{EnvRegistry, EnvSpec, create_env_registry};

/// Messages addressed to one player: `(sender_player_id, text)` pairs.
/// Sender `-1` is the game itself.
pub type Observation = Vec<(i32, String)>;

/// Terminal payoffs keyed by player id.
pub type Rewards = HashMap<i32, f64>;

/// Side information returned by a step that may end the game.
#[derive(Debug, Default, Clone)]
pub struct StepInfo {
    pub reason: Option<String>,
}

/// Capability surface over a rules engine for one game.
pub trait GameRules: Send {
    /// Concrete variant id, e.g. the game picked by a meta-environment.
    fn specific_env_id(&self) -> &str;

    /// Player id whose move the game is waiting for.
    fn current_player(&self) -> i32;

    fn is_done(&self) -> bool;

    /// Messages the given player has not yet acted on.
    fn observation(&self, player_id: i32) -> Result<Observation, RulesError>;

    /// Full message history for the given player, available even after the
    /// game has terminated.
    fn force_observation(&self, player_id: i32) -> Observation;

    /// Apply the current player's action. Returns whether the game is done
    /// plus any terminal info. Stepping a finished game is a no-op.
    fn step(&mut self, action: &str) -> Result<(bool, StepInfo), RulesError>;

    /// Extract terminal rewards. Only valid once `is_done()`.
    fn close(&mut self) -> Result<Rewards, RulesError>;
}

/// Factory producing a fresh rules instance for a new game.
pub type RulesFactory = fn() -> Box<dyn GameRules>;
