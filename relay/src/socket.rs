use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use agrideal_common::protocol::RelayEvent;

use crate::registry::RoomRegistry;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<RoomRegistry>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// Per-connection loop. One writer task drains the outbound channel into
/// the sink; the reader parses frames and routes them through the registry.
async fn handle_socket(socket: WebSocket, registry: Arc<RoomRegistry>) {
    let conn = registry.register();
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    info!(%conn, "websocket connected");

    while let Some(Ok(msg)) = stream.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Pings are answered by axum; binary and pong frames carry
            // nothing for us.
            _ => continue,
        };

        match serde_json::from_str::<RelayEvent>(text.as_str()) {
            Ok(RelayEvent::Join { negotiation_id }) => {
                info!(%conn, room = %negotiation_id, "joined room");
                registry.join(conn, tx.clone(), negotiation_id);
            }
            Ok(event) => {
                debug_assert!(event.is_broadcast());
                let delivered = registry.broadcast_from(conn, text.as_str());
                trace!(%conn, delivered, "relayed frame");
            }
            // Malformed frames are dropped without closing the connection.
            Err(err) => debug!(%conn, %err, "unparseable frame dropped"),
        }
    }

    registry.leave(conn);
    writer.abort();
    info!(%conn, "websocket disconnected");
}
