// Agent-facing routes. Polling endpoints get the generous quota; anything
// that registers or mutates goes through the tighter one.

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use crate::{
    http::handlers::model_play::{
        check_matchmaking_status, check_turn, get_results, join_matchmaking, leave_matchmaking,
        register_model, step,
    },
    middleware::{PlayRateLimit, PollRateLimit, rate_limit_middleware},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    let poll = Router::new()
        .route("/check_matchmaking_status", get(check_matchmaking_status))
        .route("/check_turn", get(check_turn))
        .layer(from_fn(rate_limit_middleware::<PollRateLimit>));

    let play = Router::new()
        .route("/register_model", post(register_model))
        .route("/join_matchmaking", post(join_matchmaking))
        .route("/leave_matchmaking", post(leave_matchmaking))
        .route("/step", post(step))
        .route("/get_results", post(get_results))
        .layer(from_fn(rate_limit_middleware::<PlayRateLimit>));

    poll.merge(play)
}
