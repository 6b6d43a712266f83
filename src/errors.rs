use axum::http::StatusCode;
use thiserror::Error;

use crate::games::RulesError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown token or token/name mismatch. Deliberately a 404 so probing
    /// for registered names and guessing tokens look identical.
    #[error("Auth failure: {0}")]
    AuthFailure(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Rules engine error: {0}")]
    RulesEngine(String),

    #[error("Agent error: {0}")]
    AgentError(String),

    #[error("Env error: {0}")]
    EnvError(String),

    #[error("Internal server error")]
    InternalError,
}

impl AppError {
    pub fn to_response(&self) -> (StatusCode, String) {
        match self {
            AppError::AuthFailure(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotYourTurn => (StatusCode::BAD_REQUEST, "Not your turn.".into()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::AlreadyExists(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Serialization(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::RulesEngine(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::AgentError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::EnvError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected server error".into(),
            ),
        }
    }
}

impl From<RulesError> for AppError {
    fn from(err: RulesError) -> Self {
        AppError::RulesEngine(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
