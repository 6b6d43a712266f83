use thiserror::Error;

/// Failures raised by a rules engine. These terminate the owning game as
/// `failed` rather than surfacing as a turn result.
#[derive(Error, Debug, Clone)]
pub enum RulesError {
    #[error("game is not finished yet")]
    NotFinished,

    #[error("unknown player id {0}")]
    UnknownPlayer(i32),

    #[error("{0}")]
    Internal(String),
}
