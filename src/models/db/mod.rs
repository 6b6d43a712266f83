// Row types mapping to the persistent tables.

mod environment;
mod game;
mod human;
mod participant;
mod player_game;
mod queue_entry;
mod rating;
mod turn_log;

pub use environment::Environment;
pub use game::{Game, GameStatus};
pub use human::Human;
pub use participant::Participant;
pub use player_game::{Outcome, PlayerGame};
pub use queue_entry::QueueEntry;
pub use rating::Rating;
pub use turn_log::TurnLog;
