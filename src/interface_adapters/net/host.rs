// Host display socket: owns one game for as long as it stays connected.

use crate::interface_adapters::net::{
    LoopControl, MAX_INVALID_MESSAGES, NetError, close_frame, close_socket, send_message,
};
use crate::interface_adapters::protocol::{
    HostClientMessage, HostServerMessage, PlayerActionDto, SnapshotDto,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::throttle::{log_ready, should_log};
use crate::use_cases::{GameRegistry, GameSession, HostAction};

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{Instrument, Span, field, info, info_span, warn};
use uuid::Uuid;

pub async fn host_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let registry = state.registry.clone();
    ws.on_upgrade(move |socket| {
        let span = info_span!("host", conn_id = %Uuid::new_v4(), game_id = field::Empty);
        handle_host_socket(socket, registry).instrument(span)
    })
}

async fn handle_host_socket(mut socket: WebSocket, registry: Arc<GameRegistry>) {
    let session = registry.create_game().await;
    let game_id = session.game_id().to_string();
    Span::current().record("game_id", game_id.as_str());

    let mut close = None;
    if let Err(e) = serve_host(&mut socket, &registry, &session, &mut close).await {
        warn!(error = ?e, "host loop exited with error");
    }
    close_socket(&mut socket, close).await;

    // The game lives exactly as long as its host connection.
    registry.delete_game(&game_id).await;
    info!("host disconnected");
}

async fn serve_host(
    socket: &mut WebSocket,
    registry: &GameRegistry,
    session: &GameSession,
    close: &mut Option<CloseFrame>,
) -> Result<(), NetError> {
    let game_id = session.game_id().to_string();

    // Subscribe before announcing the code so no early join is missed.
    let mut actions = session.subscribe_player_actions();
    let mut host_actions = session.subscribe_host_actions();
    let mut snapshots = session.subscribe_snapshots();

    let created = HostServerMessage::Created {
        join_path: format!("/games/{game_id}/play"),
        game_id: game_id.clone(),
    };
    send_message(socket, &created).await?;
    let initial = HostServerMessage::Snapshot(SnapshotDto::from(&*snapshots.borrow_and_update()));
    send_message(socket, &initial).await?;
    info!("host connected");

    let mut invalid_messages: u32 = 0;
    let mut last_invalid_log = log_ready();
    let mut last_lag_log = log_ready();

    loop {
        let control = tokio::select! {
            // Incoming message from the host display
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<HostClientMessage>(&text) {
                        Ok(HostClientMessage::End) => {
                            info!("host ended game");
                            // Removal ends the session; the End broadcast below closes the socket.
                            registry.delete_game(&game_id).await;
                            LoopControl::Continue
                        }
                        Err(error) => {
                            invalid_messages += 1;
                            if should_log(&mut last_invalid_log) {
                                warn!(bytes = text.len(), %error, "failed to parse host message");
                            }
                            if invalid_messages > MAX_INVALID_MESSAGES {
                                *close = Some(close_frame(close_code::POLICY, "too many invalid messages"));
                                LoopControl::Disconnect
                            } else {
                                LoopControl::Continue
                            }
                        }
                    }
                }
                Some(Ok(Message::Binary(_))) => {
                    *close = Some(close_frame(close_code::UNSUPPORTED, "binary messages not supported"));
                    LoopControl::Disconnect
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => LoopControl::Continue,
                Some(Ok(Message::Close(_))) | None => LoopControl::Disconnect,
                Some(Err(e)) => {
                    warn!(error = %e, "websocket recv error");
                    LoopControl::Disconnect
                }
            },

            // Player actions, in applied order
            action = actions.recv() => match action {
                Ok(action) => {
                    let msg = HostServerMessage::PlayerEvent(PlayerActionDto::from(&action));
                    send_message(socket, &msg).await?;
                    LoopControl::Continue
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // Snapshots still carry the latest state; only the event feed has gaps.
                    if should_log(&mut last_lag_log) {
                        warn!(missed, "player events lagged");
                    }
                    LoopControl::Continue
                }
                Err(broadcast::error::RecvError::Closed) => LoopControl::Disconnect,
            },

            // Scoreboard changes
            changed = snapshots.changed() => match changed {
                Ok(()) => {
                    let msg = HostServerMessage::Snapshot(SnapshotDto::from(&*snapshots.borrow_and_update()));
                    send_message(socket, &msg).await?;
                    LoopControl::Continue
                }
                Err(_) => LoopControl::Disconnect,
            },

            // Game end, whoever triggered it
            host_action = host_actions.recv() => match host_action {
                Ok(HostAction::End) | Err(broadcast::error::RecvError::Closed) => {
                    send_message(socket, &HostServerMessage::Ended).await?;
                    *close = Some(close_frame(close_code::NORMAL, "game ended"));
                    LoopControl::Disconnect
                }
                Err(broadcast::error::RecvError::Lagged(_)) => LoopControl::Continue,
            },
        };

        if let LoopControl::Disconnect = control {
            return Ok(());
        }
    }
}
