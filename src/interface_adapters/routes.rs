use crate::interface_adapters::net::{game_snapshot_handler, host_ws_handler, player_ws_handler};
use crate::interface_adapters::state::AppState;
use axum::{Router, routing::get};
use std::sync::Arc;

pub fn app(state: Arc<AppState>) -> Router {
    // Host socket creates a game; players join it by code.
    Router::new()
        .route("/host", get(host_ws_handler))
        .route("/games/{game_id}", get(game_snapshot_handler))
        .route("/games/{game_id}/play", get(player_ws_handler))
        .with_state(state)
}
