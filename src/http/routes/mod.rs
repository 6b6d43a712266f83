// Route composition: agent endpoints and human endpoints.
use axum::Router;

use crate::state::AppState;

pub mod agent;
pub mod human;

/// Build the top-level router with both endpoint families mounted at the
/// root (the wire paths are part of the public contract).
pub fn create_http_routes(state: AppState) -> Router {
    Router::new()
        .merge(agent::routes())
        .merge(human::routes())
        .with_state(state)
}
