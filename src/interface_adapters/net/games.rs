use crate::interface_adapters::http::error_response;
use crate::interface_adapters::protocol::SnapshotDto;
use crate::interface_adapters::state::AppState;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// Current scoreboard for a live game, for displays that poll instead of holding a socket.
pub async fn game_snapshot_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Response {
    match state.registry.get_game(&game_id).await {
        Some(session) => Json(SnapshotDto::from(&session.snapshot())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "game not found"),
    }
}
