// Human-facing routes, authenticated by source address.

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use crate::{
    http::handlers::human_play::{
        check_matchmaking_status, check_turn, get_match_outcome, get_stats, join_matchmaking,
        make_move, register_human,
    },
    middleware::{PlayRateLimit, PollRateLimit, rate_limit_middleware},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    let poll = Router::new()
        .route("/human/check_matchmaking_status", get(check_matchmaking_status))
        .route("/human/check_turn", get(check_turn))
        .route("/human/get_match_outcome", get(get_match_outcome))
        .route("/human/get_stats", get(get_stats))
        .layer(from_fn(rate_limit_middleware::<PollRateLimit>));

    let play = Router::new()
        .route("/human/register", post(register_human))
        .route("/human/join_matchmaking", post(join_matchmaking))
        .route("/human/make_move", post(make_move))
        .layer(from_fn(rate_limit_middleware::<PlayRateLimit>));

    poll.merge(play)
}
