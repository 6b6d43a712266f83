// Agent-facing HTTP handlers: registration, queueing, turn polling,
// action submission, and post-game results.
//
// Handlers stay thin: authenticate, translate the wire shape, and call
// into the store and session layers where the actual rules live.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::auth::{authenticate_agent, generate_token};
use crate::config::{DEFAULT_QUEUE_TIME_LIMIT, now_ts};
use crate::db::environment::EnvironmentRepository;
use crate::db::game::GameRepository;
use crate::db::participant::ParticipantRepository;
use crate::db::player_game::PlayerGameRepository;
use crate::db::queue::QueueRepository;
use crate::db::rating::RatingRepository;
use crate::db::turn_log::TurnLogRepository;
use crate::errors::AppError;
use crate::http::handlers::engine_failure_response;
use crate::session::{conclude_game, decode_observation, encode_observation};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterModelRequest {
    pub model_name: String,
    pub description: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterModelResponse {
    pub model_token: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinMatchmakingRequest {
    pub env_id: String,
    pub model_name: String,
    pub model_token: String,
    pub queue_time_limit: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveMatchmakingRequest {
    pub model_name: String,
    pub model_token: String,
    pub env_id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchmakingStatusQuery {
    pub env_id: String,
    pub model_name: String,
    pub model_token: String,
}

/// Queue poll answer: either still searching or the match coordinates.
#[derive(Debug, Serialize)]
pub struct MatchmakingStatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_time_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_players: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CheckTurnQuery {
    pub env_id: String,
    pub model_name: String,
    pub model_token: String,
    pub game_id: i64,
    pub player_id: i32,
}

#[derive(Debug, Serialize)]
pub struct CheckTurnResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct StepRequest {
    pub env_id: String,
    pub model_name: String,
    pub model_token: String,
    pub game_id: i64,
    pub action_text: String,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub message: String,
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct GetResultsRequest {
    pub game_id: i64,
    pub model_name: String,
    pub env_id: String,
}

#[derive(Debug, Serialize)]
pub struct GetResultsResponse {
    pub reward: Option<f64>,
    pub reason: Option<String>,
    pub prev_elo_score: Option<f64>,
    pub current_elo_score: f64,
    pub opponent_names: String,
    pub outcome: Option<String>,
}

// ============================================================================
// Registration
// ============================================================================

/// Register a new agent participant and mint its bearer token.
///
/// Public endpoint. The token is returned exactly once.
pub async fn register_model(
    State(state): State<AppState>,
    Json(payload): Json<RegisterModelRequest>,
) -> Result<Json<RegisterModelResponse>, (StatusCode, String)> {
    email_address::EmailAddress::from_str(&payload.email).map_err(|e| {
        tracing::warn!("Rejected registration with invalid email: {}", e);
        AppError::InvalidInput(format!("Invalid email address: {}", e)).to_response()
    })?;

    let token = generate_token();
    ParticipantRepository::new(state.postgres.clone())
        .create(&payload.model_name, &payload.description, &payload.email, &token)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(RegisterModelResponse { model_token: token }))
}

// ============================================================================
// Queueing
// ============================================================================

/// Enter the matchmaking queue for an environment.
pub async fn join_matchmaking(
    State(state): State<AppState>,
    Json(payload): Json<JoinMatchmakingRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    authenticate_agent(&state.postgres, &payload.model_name, &payload.model_token)
        .await
        .map_err(|e| e.to_response())?;

    EnvironmentRepository::new(state.postgres.clone())
        .find_by_id(&payload.env_id)
        .await
        .map_err(|_| AppError::NotFound("Invalid environment ID.".into()).to_response())?;

    let queue = QueueRepository::new(state.postgres.clone());
    if queue
        .find_agent_entry(&payload.env_id, &payload.model_name)
        .await
        .map_err(|e| e.to_response())?
        .is_some()
    {
        return Err(AppError::BadRequest("Already in matchmaking queue.".into()).to_response());
    }

    let in_game = GameRepository::new(state.postgres.clone())
        .active_game_for_participant(&payload.env_id, &payload.model_name)
        .await
        .map_err(|e| e.to_response())?;
    if in_game.is_some() {
        return Err(AppError::BadRequest("Already in an active game.".into()).to_response());
    }

    let time_limit = payload.queue_time_limit.unwrap_or(DEFAULT_QUEUE_TIME_LIMIT);
    queue
        .enqueue_agent(&payload.env_id, &payload.model_name, time_limit)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(MessageResponse {
        message: "Matchmaking request submitted".to_string(),
    }))
}

/// Leave the matchmaking queue for an environment.
pub async fn leave_matchmaking(
    State(state): State<AppState>,
    Json(payload): Json<LeaveMatchmakingRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    authenticate_agent(&state.postgres, &payload.model_name, &payload.model_token)
        .await
        .map_err(|e| e.to_response())?;

    let removed = QueueRepository::new(state.postgres.clone())
        .delete_agent_entry(&payload.env_id, &payload.model_name)
        .await
        .map_err(|e| e.to_response())?;
    if !removed {
        return Err(AppError::NotFound("Model not in matchmaking queue.".into()).to_response());
    }

    Ok(Json(MessageResponse {
        message: format!(
            "Model '{}' has left the matchmaking queue for environment '{}'.",
            payload.model_name, payload.env_id
        ),
    }))
}

/// Poll the queue. Refreshes the inactivity clock; once matched, returns
/// the match coordinates instead.
pub async fn check_matchmaking_status(
    State(state): State<AppState>,
    Query(query): Query<MatchmakingStatusQuery>,
) -> Result<Json<MatchmakingStatusResponse>, (StatusCode, String)> {
    authenticate_agent(&state.postgres, &query.model_name, &query.model_token)
        .await
        .map_err(|e| e.to_response())?;

    let queue = QueueRepository::new(state.postgres.clone());
    if let Some(entry) = queue
        .find_agent_entry(&query.env_id, &query.model_name)
        .await
        .map_err(|e| e.to_response())?
    {
        queue
            .touch_last_checked(entry.id)
            .await
            .map_err(|e| e.to_response())?;
        return Ok(Json(MatchmakingStatusResponse {
            status: "Searching".to_string(),
            queue_time: Some(now_ts() - entry.joined_at),
            queue_time_limit: Some(entry.time_limit),
            game_id: None,
            player_id: None,
            opponent_name: None,
            num_players: None,
        }));
    }

    let game = GameRepository::new(state.postgres.clone())
        .active_game_for_participant(&query.env_id, &query.model_name)
        .await
        .map_err(|e| e.to_response())?;
    if let Some(game) = game {
        let seats = PlayerGameRepository::new(state.postgres.clone());
        let players = seats.for_game(game.id).await.map_err(|e| e.to_response())?;
        let me = players
            .iter()
            .find(|p| p.participant_name == query.model_name)
            .ok_or_else(|| AppError::NotFound("Game not found.".into()).to_response())?;
        let opponents: Vec<String> = players
            .iter()
            .filter(|p| p.id != me.id)
            .map(|p| p.participant_name.clone())
            .collect();

        return Ok(Json(MatchmakingStatusResponse {
            status: "Match found".to_string(),
            queue_time: None,
            queue_time_limit: None,
            game_id: Some(game.id),
            player_id: Some(me.player_id),
            opponent_name: Some(opponents.join(", ")),
            num_players: Some(players.len()),
        }));
    }

    Err(AppError::NotFound("Not in matchmaking or game.".into()).to_response())
}

// ============================================================================
// Turn Polling
// ============================================================================

/// Poll for the current observation. On a terminal game this returns the
/// end-state observation with `done: true` so agents learn how it ended;
/// it is a pure read and never touches the turn log.
pub async fn check_turn(
    State(state): State<AppState>,
    Query(query): Query<CheckTurnQuery>,
) -> Result<Json<CheckTurnResponse>, (StatusCode, String)> {
    authenticate_agent(&state.postgres, &query.model_name, &query.model_token)
        .await
        .map_err(|e| e.to_response())?;

    let game = GameRepository::new(state.postgres.clone())
        .find_by_id(query.game_id)
        .await
        .map_err(|e| e.to_response())?;

    let seats = PlayerGameRepository::new(state.postgres.clone());
    let seat = seats
        .find(query.game_id, &query.model_name)
        .await
        .map_err(|e| e.to_response())?
        .ok_or_else(|| AppError::NotFound("No player record for this game.".into()).to_response())?;

    if !game.is_active() {
        let observation = match state.sessions.peek(query.game_id).await {
            Some(session) => {
                let full = session.force_observation(seat.player_id).await;
                serde_json::to_value(&full).unwrap_or_else(|_| terminal_observation())
            }
            None => terminal_observation(),
        };
        return Ok(Json(CheckTurnResponse {
            status: "Game concluded".to_string(),
            observation: Some(observation),
            done: Some(true),
        }));
    }

    if query.player_id != seat.player_id {
        return Err(AppError::NotFound("Player ID mismatch.".into()).to_response());
    }

    seats
        .touch_last_action(seat.id)
        .await
        .map_err(|e| e.to_response())?;

    let session = match state.sessions.get_or_create(&state, query.game_id).await {
        Ok(session) => session,
        Err(e) => return Err(engine_failure_response(&state, query.game_id, e).await),
    };

    if !session.is_player_turn(seat.player_id).await {
        return Ok(Json(CheckTurnResponse {
            status: "Not your turn".to_string(),
            observation: None,
            done: None,
        }));
    }

    // A still-pending observation is returned as-is: repeated polls see the
    // same turn and the deadline clock keeps running from first delivery.
    let turn_logs = TurnLogRepository::new(state.postgres.clone());
    let observation = match turn_logs
        .pending_for_player_game(seat.id)
        .await
        .map_err(|e| e.to_response())?
    {
        Some(pending) => decode_observation(&pending.observation).map_err(|e| e.to_response())?,
        None => {
            let fresh = session
                .observation(seat.player_id)
                .await
                .map_err(|e| e.to_response())?;
            let encoded = encode_observation(&fresh).map_err(|e| e.to_response())?;
            turn_logs
                .create_pending(seat.id, &seat.participant_name, &encoded)
                .await
                .map_err(|e| e.to_response())?;
            serde_json::to_value(&fresh)
                .map_err(|e| AppError::Serialization(e.to_string()).to_response())?
        }
    };

    Ok(Json(CheckTurnResponse {
        status: "Your turn".to_string(),
        observation: Some(observation),
        done: Some(false),
    }))
}

// ============================================================================
// Action Submission
// ============================================================================

/// Submit the action answering the pending observation. Rejected with 400
/// when it is no longer the caller's turn, which is what makes duplicate
/// submissions safe. A step into a finished game reports `done` instead
/// of erroring.
pub async fn step(
    State(state): State<AppState>,
    Json(payload): Json<StepRequest>,
) -> Result<Json<StepResponse>, (StatusCode, String)> {
    authenticate_agent(&state.postgres, &payload.model_name, &payload.model_token)
        .await
        .map_err(|e| e.to_response())?;

    let game = GameRepository::new(state.postgres.clone())
        .find_by_id(payload.game_id)
        .await
        .map_err(|e| e.to_response())?;

    let seats = PlayerGameRepository::new(state.postgres.clone());
    let seat = seats
        .find(payload.game_id, &payload.model_name)
        .await
        .map_err(|e| e.to_response())?;

    if game.is_finished() {
        if seat.is_some() {
            return Ok(Json(StepResponse {
                message: "Game concluded.".to_string(),
                done: true,
            }));
        }
        return Err(AppError::NotFound("No active game found.".into()).to_response());
    }
    let Some(seat) = seat.filter(|_| game.is_active()) else {
        return Err(AppError::NotFound("No active game found.".into()).to_response());
    };

    seats
        .touch_last_action(seat.id)
        .await
        .map_err(|e| e.to_response())?;

    let session = match state.sessions.get_or_create(&state, payload.game_id).await {
        Ok(session) => session,
        Err(e) => return Err(engine_failure_response(&state, payload.game_id, e).await),
    };

    let result = match session
        .submit_action(&state, seat.player_id, &payload.action_text)
        .await
    {
        Ok(result) => result,
        Err(AppError::NotYourTurn) => {
            return Err(AppError::NotYourTurn.to_response());
        }
        Err(e) => return Err(engine_failure_response(&state, payload.game_id, e).await),
    };

    // Answer the pending observation for this seat.
    let turn_logs = TurnLogRepository::new(state.postgres.clone());
    if let Some(pending) = turn_logs
        .pending_for_player_game(seat.id)
        .await
        .map_err(|e| e.to_response())?
    {
        turn_logs
            .fill_action(pending.id, &payload.action_text)
            .await
            .map_err(|e| e.to_response())?;
    }

    let done = conclude_game(&state, payload.game_id, &result)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(StepResponse {
        message: "Action submitted.".to_string(),
        done,
    }))
}

// ============================================================================
// Results
// ============================================================================

/// Post-game summary: reward, outcome, reason, and the rating movement.
pub async fn get_results(
    State(state): State<AppState>,
    Json(payload): Json<GetResultsRequest>,
) -> Result<Json<GetResultsResponse>, (StatusCode, String)> {
    let seat = PlayerGameRepository::new(state.postgres.clone())
        .find(payload.game_id, &payload.model_name)
        .await
        .map_err(|e| e.to_response())?
        .ok_or_else(|| AppError::NotFound("Game not found.".into()).to_response())?;

    let ratings = RatingRepository::new(state.postgres.clone())
        .latest_two(&payload.model_name, &payload.env_id)
        .await
        .map_err(|e| e.to_response())?;
    if ratings.is_empty() {
        return Err(AppError::NotFound("No elo scores.".into()).to_response());
    }
    let current_elo_score = ratings[0].elo;
    let prev_elo_score = ratings.get(1).map(|r| r.elo);

    let players = PlayerGameRepository::new(state.postgres.clone())
        .for_game(payload.game_id)
        .await
        .map_err(|e| e.to_response())?;
    let opponent_names: Vec<String> = players
        .iter()
        .filter(|p| p.id != seat.id)
        .map(|p| p.participant_name.clone())
        .collect();

    let game = GameRepository::new(state.postgres.clone())
        .find_by_id(payload.game_id)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(GetResultsResponse {
        reward: seat.reward,
        reason: game.reason,
        prev_elo_score,
        current_elo_score,
        opponent_names: opponent_names.join(", "),
        outcome: seat.outcome,
    }))
}

/// Fallback terminal observation when the session is already gone.
fn terminal_observation() -> serde_json::Value {
    serde_json::json!([[-1, "Game concluded"]])
}
