// Network adapter modules split by socket role, plus the plain HTTP routes.

pub mod games;
pub mod host;
pub mod player;

pub use games::game_snapshot_handler;
pub use host::host_ws_handler;
pub use player::player_ws_handler;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::SinkExt;
use serde::Serialize;
use tracing::debug;

// Unparseable text frames tolerated before a socket is closed.
pub(crate) const MAX_INVALID_MESSAGES: u32 = 10;

#[derive(Debug)]
pub(crate) enum NetError {
    // Categorizes connection failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
}

pub(crate) enum LoopControl {
    Continue,
    Disconnect,
}

pub(crate) async fn send_message<T: Serialize>(
    socket: &mut WebSocket,
    msg: &T,
) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

// Sends the optional close frame and closes the socket, ignoring errors from a peer that is
// already gone.
pub(crate) async fn close_socket(socket: &mut WebSocket, frame: Option<CloseFrame>) {
    if let Some(frame) = frame {
        let _ = socket.send(Message::Close(Some(frame))).await;
    }
    if let Err(err) = SinkExt::close(socket).await {
        debug!(error = ?err, "socket close error");
    }
}

pub(crate) fn close_frame(code: u16, reason: &'static str) -> CloseFrame {
    CloseFrame {
        code,
        reason: reason.into(),
    }
}
