// Database repositories and helpers
pub mod environment;
pub mod game;
pub mod human;
pub mod participant;
pub mod player_game;
pub mod queue;
pub mod rating;
pub mod turn_log;
