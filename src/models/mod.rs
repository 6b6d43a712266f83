pub mod db;

pub use db::{
    Environment, Game, GameStatus, Human, Outcome, Participant, PlayerGame, QueueEntry, Rating,
    TurnLog,
};
