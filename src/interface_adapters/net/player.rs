// Player phone socket: turns orientation frames and taps into session actions.

use crate::domain::{AimTracker, PlayerId};
use crate::interface_adapters::http::error_response;
use crate::interface_adapters::net::{
    LoopControl, MAX_INVALID_MESSAGES, NetError, close_frame, close_socket, send_message,
};
use crate::interface_adapters::protocol::{PlayerClientMessage, PlayerServerMessage};
use crate::interface_adapters::state::AppState;
use crate::use_cases::throttle::{log_ready, should_log};
use crate::use_cases::{GameRegistry, GameSession, HostAction, SessionError};

use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{Instrument, Span, field, info, info_span, warn};
use uuid::Uuid;

pub async fn player_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Response {
    // Reject unknown codes before the upgrade so the phone gets a plain 404.
    if state.registry.get_game(&game_id).await.is_none() {
        return error_response(StatusCode::NOT_FOUND, "game not found");
    }

    let registry = state.registry.clone();
    ws.on_upgrade(move |socket| {
        let span = info_span!(
            "player",
            conn_id = %Uuid::new_v4(),
            game_id = %game_id,
            player_id = field::Empty
        );
        handle_player_socket(socket, registry, game_id).instrument(span)
    })
    .into_response()
}

async fn handle_player_socket(mut socket: WebSocket, registry: Arc<GameRegistry>, game_id: String) {
    // The game may have ended between the lookup and the upgrade.
    let (session, player_id) = match registry.join_game(&game_id).await {
        Ok(joined) => joined,
        Err(_) => {
            info!("join rejected, game not found");
            close_socket(
                &mut socket,
                Some(close_frame(close_code::POLICY, "game not found")),
            )
            .await;
            return;
        }
    };
    Span::current().record("player_id", field::display(player_id));
    info!("player joined");

    let mut close = None;
    if let Err(e) = serve_player(&mut socket, &session, player_id, &mut close).await {
        warn!(error = ?e, "player loop exited with error");
    }
    close_socket(&mut socket, close).await;

    // An ended session rejects the leave; nothing is left to clean up then.
    if let Err(SessionError::Ended) = session.leave(player_id).await {
        info!("player disconnected after game end");
    } else {
        info!("player left");
    }
}

async fn serve_player(
    socket: &mut WebSocket,
    session: &GameSession,
    player_id: PlayerId,
    close: &mut Option<CloseFrame>,
) -> Result<(), NetError> {
    let mut host_actions = session.subscribe_host_actions();
    // End may have fired before the subscription existed.
    if session.is_ended() {
        send_message(socket, &PlayerServerMessage::Ended).await?;
        *close = Some(close_frame(close_code::NORMAL, "game ended"));
        return Ok(());
    }

    let identity = PlayerServerMessage::Identity {
        player_id: player_id.to_string(),
        game_id: session.game_id().to_string(),
        hue: player_id.hue(),
    };
    send_message(socket, &identity).await?;

    let mut tracker = AimTracker::new();
    let mut invalid_messages: u32 = 0;
    let mut last_invalid_log = log_ready();
    let mut last_reading_log = log_ready();

    loop {
        let control = tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<PlayerClientMessage>(&text) {
                        Ok(msg) => {
                            let submitted = match msg {
                                PlayerClientMessage::Orientation(values) => {
                                    match tracker.observe(&values) {
                                        Ok(angle) => session.aim(player_id, angle).await,
                                        Err(reason) => {
                                            // Sensor glitches are dropped, not counted against the client.
                                            if should_log(&mut last_reading_log) {
                                                warn!(?reason, "dropping malformed orientation");
                                            }
                                            Ok(())
                                        }
                                    }
                                }
                                PlayerClientMessage::ResetAim => {
                                    let angle = tracker.reset();
                                    session.aim(player_id, angle).await
                                }
                                PlayerClientMessage::Throw => session.throw(player_id).await,
                            };
                            match submitted {
                                Ok(()) => LoopControl::Continue,
                                // The End broadcast arrives next and closes the socket.
                                Err(SessionError::Ended) => LoopControl::Continue,
                            }
                        }
                        Err(error) => {
                            invalid_messages += 1;
                            if should_log(&mut last_invalid_log) {
                                warn!(bytes = text.len(), %error, "failed to parse player message");
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

            host_action = host_actions.recv() => match host_action {
                Ok(HostAction::End) | Err(broadcast::error::RecvError::Closed) => {
                    send_message(socket, &PlayerServerMessage::Ended).await?;
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
