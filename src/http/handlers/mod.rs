// HTTP handlers: agent play and human play

use axum::http::StatusCode;

use crate::errors::AppError;
use crate::session::fail_game;
use crate::state::AppState;

pub mod human_play;
pub mod model_play;

/// Translate a session-layer error into a response, terminating the game
/// first when the rules engine or local agent is the thing that broke.
/// Engine failures are terminal for the game, not for the server.
pub(crate) async fn engine_failure_response(
    state: &AppState,
    game_id: i64,
    err: AppError,
) -> (StatusCode, String) {
    match &err {
        AppError::RulesEngine(msg) | AppError::AgentError(msg) => {
            let reason = format!("engine error: {}", msg);
            if let Err(fail_err) = fail_game(state, game_id, Some(&reason)).await {
                tracing::error!("Failed to fail game {}: {}", game_id, fail_err);
            }
        }
        _ => {}
    }
    err.to_response()
}
