// Human-facing HTTP handlers. Humans are authenticated by source address
// and share the `Humanity` pseudo-participant; their queue entries and
// seats are keyed by IP.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_ENV_ID, DEFAULT_QUEUE_TIME_LIMIT, HUMANITY_NAME};
use crate::db::game::GameRepository;
use crate::db::human::HumanRepository;
use crate::db::player_game::PlayerGameRepository;
use crate::db::queue::QueueRepository;
use crate::db::turn_log::TurnLogRepository;
use crate::errors::AppError;
use crate::http::handlers::engine_failure_response;
use crate::session::{StepResult, conclude_game, decode_observation, encode_observation};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RegisterHumanResponse {
    pub human_id: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HumanStatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HumanCheckTurnQuery {
    pub game_id: i64,
}

#[derive(Debug, Serialize)]
pub struct HumanCheckTurnResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct HumanMoveRequest {
    pub game_id: i64,
    #[serde(rename = "move")]
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct HumanMoveResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchOutcomeQuery {
    pub player_id: i32,
    pub game_id: i64,
}

#[derive(Debug, Serialize)]
pub struct MatchOutcomeResponse {
    pub outcome: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecentGame {
    pub environment: Option<String>,
    pub opponent: String,
    pub outcome: String,
}

#[derive(Debug, Serialize)]
pub struct HumanStatsResponse {
    pub games_played: usize,
    pub win_rate: f64,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub recent_games: Vec<RecentGame>,
}

// ============================================================================
// Registration & Queueing
// ============================================================================

/// Create (or refresh) the human record for this source address.
pub async fn register_human(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<RegisterHumanResponse>, (StatusCode, String)> {
    let human = HumanRepository::new(state.postgres.clone())
        .create_or_refresh(&addr.ip().to_string())
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(RegisterHumanResponse { human_id: human.id }))
}

/// Queue this address into the default environment as `Humanity`.
pub async fn join_matchmaking(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let ip = addr.ip().to_string();
    let queue = QueueRepository::new(state.postgres.clone());

    if queue
        .find_human_entry(&ip)
        .await
        .map_err(|e| e.to_response())?
        .is_some()
    {
        return Err(AppError::BadRequest("Already in matchmaking queue.".into()).to_response());
    }

    queue
        .enqueue_human(DEFAULT_ENV_ID, HUMANITY_NAME, &ip, DEFAULT_QUEUE_TIME_LIMIT)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(MessageResponse {
        message: "Added to matchmaking queue".to_string(),
    }))
}

/// Poll the human queue by source address.
pub async fn check_matchmaking_status(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<HumanStatusResponse>, (StatusCode, String)> {
    let ip = addr.ip().to_string();
    let queue = QueueRepository::new(state.postgres.clone());

    if let Some(entry) = queue
        .find_human_entry(&ip)
        .await
        .map_err(|e| e.to_response())?
    {
        queue
            .touch_last_checked(entry.id)
            .await
            .map_err(|e| e.to_response())?;
        return Ok(Json(HumanStatusResponse {
            status: "Searching".to_string(),
            game_id: None,
            player_id: None,
            opponent_name: None,
            env_id: None,
        }));
    }

    let game = GameRepository::new(state.postgres.clone())
        .active_game_for_human(&ip)
        .await
        .map_err(|e| e.to_response())?;
    if let Some(game) = game {
        let seats = PlayerGameRepository::new(state.postgres.clone());
        let me = seats
            .find_by_human_ip(game.id, &ip)
            .await
            .map_err(|e| e.to_response())?
            .ok_or_else(|| AppError::NotFound("Game not found.".into()).to_response())?;
        let opponents: Vec<String> = seats
            .for_game(game.id)
            .await
            .map_err(|e| e.to_response())?
            .into_iter()
            .filter(|p| p.id != me.id)
            .map(|p| p.participant_name)
            .collect();

        return Ok(Json(HumanStatusResponse {
            status: "Match found".to_string(),
            game_id: Some(game.id),
            player_id: Some(me.player_id),
            opponent_name: Some(opponents.join(", ")),
            env_id: game.specific_env_id,
        }));
    }

    Ok(Json(HumanStatusResponse {
        status: "Not in matchmaking or game".to_string(),
        game_id: None,
        player_id: None,
        opponent_name: None,
        env_id: None,
    }))
}

// ============================================================================
// Turn Flow
// ============================================================================

/// Current observation for the human seat of a game.
pub async fn check_turn(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<HumanCheckTurnQuery>,
) -> Result<Json<HumanCheckTurnResponse>, (StatusCode, String)> {
    let ip = addr.ip().to_string();

    let seat = PlayerGameRepository::new(state.postgres.clone())
        .find_by_human_ip(query.game_id, &ip)
        .await
        .map_err(|e| e.to_response())?
        .ok_or_else(|| AppError::NotFound("No active game for this IP".into()).to_response())?;

    let game = GameRepository::new(state.postgres.clone())
        .find_by_id(query.game_id)
        .await
        .map_err(|e| e.to_response())?;

    if !game.is_active() {
        return Ok(Json(concluded_response()));
    }

    let session = match state.sessions.get_or_create(&state, query.game_id).await {
        Ok(session) => session,
        Err(e) => return Err(engine_failure_response(&state, query.game_id, e).await),
    };

    if session.is_done().await {
        return Ok(Json(concluded_response()));
    }

    if !session.is_player_turn(seat.player_id).await {
        return Ok(Json(HumanCheckTurnResponse {
            status: "Not your turn".to_string(),
            observation: None,
            done: None,
        }));
    }

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
                .create_pending(seat.id, HUMANITY_NAME, &encoded)
                .await
                .map_err(|e| e.to_response())?;
            serde_json::to_value(&fresh)
                .map_err(|e| AppError::Serialization(e.to_string()).to_response())?
        }
    };

    Ok(Json(HumanCheckTurnResponse {
        status: "Your turn".to_string(),
        observation: Some(observation),
        done: Some(false),
    }))
}

/// Submit the human's move.
pub async fn make_move(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<HumanMoveRequest>,
) -> Result<Json<HumanMoveResponse>, (StatusCode, String)> {
    let ip = addr.ip().to_string();

    let seats = PlayerGameRepository::new(state.postgres.clone());
    let seat = seats
        .find_by_human_ip(payload.game_id, &ip)
        .await
        .map_err(|e| e.to_response())?;

    let game = GameRepository::new(state.postgres.clone())
        .find_by_id(payload.game_id)
        .await
        .map_err(|e| e.to_response())?;
    let Some(seat) = seat.filter(|_| game.is_active()) else {
        return Err(AppError::NotFound("Game not found or not active".into()).to_response());
    };

    let session = match state.sessions.get_or_create(&state, payload.game_id).await {
        Ok(session) => session,
        Err(e) => return Err(engine_failure_response(&state, payload.game_id, e).await),
    };

    let result = match session
        .submit_action(&state, seat.player_id, &payload.action)
        .await
    {
        Ok(result) => result,
        Err(AppError::NotYourTurn) => return Err(AppError::NotYourTurn.to_response()),
        Err(e) => return Err(engine_failure_response(&state, payload.game_id, e).await),
    };

    seats
        .touch_last_action(seat.id)
        .await
        .map_err(|e| e.to_response())?;

    let turn_logs = TurnLogRepository::new(state.postgres.clone());
    if let Some(pending) = turn_logs
        .pending_for_player_game(seat.id)
        .await
        .map_err(|e| e.to_response())?
    {
        turn_logs
            .fill_action(pending.id, &payload.action)
            .await
            .map_err(|e| e.to_response())?;
    }

    if let StepResult::Finished { rewards, info } = &result {
        let reward = rewards.get(&seat.player_id).copied();
        let reason = info.reason.clone();

        conclude_game(&state, payload.game_id, &result)
            .await
            .map_err(|e| e.to_response())?;
        HumanRepository::new(state.postgres.clone())
            .increment_games_played(&ip)
            .await
            .map_err(|e| e.to_response())?;

        return Ok(Json(HumanMoveResponse {
            status: "Game completed".to_string(),
            done: Some(true),
            reward,
            reason,
        }));
    }

    Ok(Json(HumanMoveResponse {
        status: "Move accepted".to_string(),
        done: Some(false),
        reward: None,
        reason: None,
    }))
}

// ============================================================================
// Post-game
// ============================================================================

/// Final outcome for a seat of a game.
pub async fn get_match_outcome(
    State(state): State<AppState>,
    Query(query): Query<MatchOutcomeQuery>,
) -> Result<Json<MatchOutcomeResponse>, (StatusCode, String)> {
    let seat = PlayerGameRepository::new(state.postgres.clone())
        .find_by_seat(query.game_id, query.player_id)
        .await
        .map_err(|e| e.to_response())?
        .ok_or_else(|| AppError::NotFound("Player record not found".into()).to_response())?;

    let game = GameRepository::new(state.postgres.clone())
        .find_by_id(query.game_id)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(MatchOutcomeResponse {
        outcome: seat.outcome,
        reason: game.reason,
    }))
}

/// Lifetime stats for this address: counts, win rate, and the last 10
/// games with environment and opponents.
pub async fn get_stats(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<HumanStatsResponse>, (StatusCode, String)> {
    let ip = addr.ip().to_string();

    let human = HumanRepository::new(state.postgres.clone())
        .find_by_ip(&ip)
        .await
        .map_err(|e| e.to_response())?;
    if human.is_none() {
        return Ok(Json(HumanStatsResponse {
            games_played: 0,
            win_rate: 0.0,
            wins: 0,
            losses: 0,
            draws: 0,
            recent_games: Vec::new(),
        }));
    }

    let seats = PlayerGameRepository::new(state.postgres.clone());
    let history = seats
        .history_for_human(&ip)
        .await
        .map_err(|e| e.to_response())?;

    let games_played = history.len();
    let wins = history.iter().filter(|s| s.outcome.as_deref() == Some("Win")).count();
    let losses = history.iter().filter(|s| s.outcome.as_deref() == Some("Loss")).count();
    let draws = history.iter().filter(|s| s.outcome.as_deref() == Some("Draw")).count();
    let win_rate = if games_played == 0 {
        0.0
    } else {
        wins as f64 / games_played as f64
    };

    let games = GameRepository::new(state.postgres.clone());
    let mut recent_games = Vec::new();
    for seat in history.iter().take(10) {
        let game = games
            .find_by_id(seat.game_id)
            .await
            .map_err(|e| e.to_response())?;
        let opponents: Vec<String> = seats
            .for_game(seat.game_id)
            .await
            .map_err(|e| e.to_response())?
            .into_iter()
            .filter(|p| p.id != seat.id)
            .map(|p| p.participant_name)
            .collect();

        recent_games.push(RecentGame {
            environment: game.specific_env_id,
            opponent: if opponents.is_empty() {
                "N/A".to_string()
            } else {
                opponents.join(", ")
            },
            outcome: seat.outcome.clone().unwrap_or_else(|| "Unknown".to_string()),
        });
    }

    Ok(Json(HumanStatsResponse {
        games_played,
        win_rate,
        wins,
        losses,
        draws,
        recent_games,
    }))
}

fn concluded_response() -> HumanCheckTurnResponse {
    HumanCheckTurnResponse {
        status: "Game concluded".to_string(),
        observation: Some(serde_json::Value::String("Game has ended".to_string())),
        done: Some(true),
    }
}
