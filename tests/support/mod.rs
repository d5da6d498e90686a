// Shared server bootstrap and socket helpers for the integration tests.
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

// Host:port of the shared server, set once it accepts connections.
static SERVER_ADDR: OnceLock<String> = OnceLock::new();

// Boots one server per test binary and returns its address.
pub fn ensure_server() -> &'static str {
    SERVER_ADDR.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);
        // The server gets its own thread and runtime so it outlives each `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_thread.set(addr.to_string());
                party_server::run(listener).await.expect("server failed");
            });
        });
        wait_until_accepting(&published)
    })
}

fn wait_until_accepting(published: &OnceLock<String>) -> String {
    let addr = loop {
        if let Some(addr) = published.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return addr;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}

pub fn http_url(path: &str) -> String {
    format!("http://{}{path}", ensure_server())
}

pub async fn connect(path: &str) -> Socket {
    let url = format!("ws://{}{path}", ensure_server());
    let (socket, _) = connect_async(url.as_str())
        .await
        .expect("websocket handshake should succeed");
    socket
}

pub async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::text(value.to_string()))
        .await
        .expect("send should succeed");
}

// Next JSON text frame, or None once the socket closes.
pub async fn next_json(socket: &mut Socket) -> Option<Value> {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, socket.next())
            .await
            .expect("timed out waiting for a frame");
        match frame {
            Some(Ok(Message::Text(text))) => {
                return Some(serde_json::from_str(&text).expect("frame should be JSON"));
            }
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
            Some(Ok(_)) => continue,
        }
    }
}

// Skips frames until one satisfies `matches`.
pub async fn expect_json(socket: &mut Socket, mut matches: impl FnMut(&Value) -> bool) -> Value {
    loop {
        let value = next_json(socket)
            .await
            .expect("socket closed before the expected message");
        if matches(&value) {
            return value;
        }
    }
}

pub fn is_type(value: &Value, kind: &str) -> bool {
    value["type"] == kind
}

// Opens a host socket and returns it with the announced game id and join path.
pub async fn host_game() -> (Socket, String, String) {
    let mut host = connect("/host").await;
    let created = expect_json(&mut host, |v| is_type(v, "Created")).await;
    let game_id = created["data"]["game_id"]
        .as_str()
        .expect("game_id should be a string")
        .to_string();
    let join_path = created["data"]["join_path"]
        .as_str()
        .expect("join_path should be a string")
        .to_string();
    (host, game_id, join_path)
}
