//! End-to-end harness for the relay: serves the real router on an ephemeral
//! port and drives it with real websocket clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use agrideal_common::negotiation::NegotiationId;
use agrideal_common::protocol::RelayEvent;
use agrideal_relay::{router, RoomRegistry};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE_WINDOW: Duration = Duration::from_millis(300);

/// Start a relay on 127.0.0.1 with an OS-assigned port and return its
/// address together with the registry it serves.
pub async fn spawn_relay() -> anyhow::Result<(SocketAddr, Arc<RoomRegistry>)> {
    let registry = Arc::new(RoomRegistry::new());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind ephemeral port")?;
    let addr = listener.local_addr()?;
    let app = router(registry.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((addr, registry))
}

/// Wait until the relay has registered the expected room and member counts.
/// Joins travel on separate connections, so tests sync on the registry
/// before sending frames that should fan out.
pub async fn wait_for(registry: &RoomRegistry, rooms: usize, connections: usize) -> anyhow::Result<()> {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    loop {
        if registry.room_count() == rooms && registry.connection_count() == connections {
            return Ok(());
        }
        if tokio::time::Instant::now() > deadline {
            bail!(
                "registry never reached {rooms} rooms / {connections} connections (at {} / {})",
                registry.room_count(),
                registry.connection_count()
            );
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// One websocket participant.
pub struct RelayClient {
    name: &'static str,
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl RelayClient {
    pub async fn connect(addr: SocketAddr, name: &'static str) -> anyhow::Result<Self> {
        let (ws, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .with_context(|| format!("{name} failed to connect"))?;
        Ok(Self { name, ws })
    }

    pub async fn join(&mut self, room: &str) -> anyhow::Result<()> {
        self.send_event(&RelayEvent::Join {
            negotiation_id: NegotiationId(room.to_string()),
        })
        .await
    }

    pub async fn send_event(&mut self, event: &RelayEvent) -> anyhow::Result<()> {
        self.send_raw(&serde_json::to_string(event)?).await
    }

    pub async fn send_raw(&mut self, frame: &str) -> anyhow::Result<()> {
        self.ws
            .send(Message::text(frame))
            .await
            .with_context(|| format!("{} failed to send", self.name))
    }

    /// Next event frame, or an error after a timeout.
    pub async fn recv_event(&mut self) -> anyhow::Result<RelayEvent> {
        let deadline = tokio::time::sleep(RECV_TIMEOUT);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => bail!("{} timed out waiting for a frame", self.name),
                msg = self.ws.next() => {
                    let msg = msg
                        .with_context(|| format!("{} connection closed", self.name))??;
                    if let Message::Text(text) = msg {
                        return Ok(serde_json::from_str(text.as_str())?);
                    }
                }
            }
        }
    }

    /// Assert that nothing arrives within a short window.
    pub async fn expect_silence(&mut self) -> anyhow::Result<()> {
        tokio::select! {
            _ = tokio::time::sleep(SILENCE_WINDOW) => Ok(()),
            msg = self.ws.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    bail!("{} received an unexpected frame: {text}", self.name)
                }
                _ => Ok(()),
            },
        }
    }
}
