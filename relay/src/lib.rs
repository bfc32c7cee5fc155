//! Realtime relay for negotiation rooms.
//!
//! Clients connect over a websocket, join the room for their negotiation,
//! and every subsequent event frame they send is fanned out verbatim to the
//! other members of that room. The relay never interprets event payloads
//! beyond routing; persistence and authorization live in the engine behind
//! the application layer.

use std::sync::Arc;

use axum::routing::{any, get};
use axum::{Json, Router};
use axum::extract::State;
use serde_json::json;
use tower_http::cors::CorsLayer;

pub mod registry;
pub mod socket;

pub use registry::{ConnId, RoomRegistry};

/// Build the relay router over a shared registry. Exposed separately from
/// the binary so tests can serve it on an ephemeral port.
pub fn router(registry: Arc<RoomRegistry>) -> Router {
    Router::new()
        .route("/ws", any(socket::ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(registry)
}

async fn health(State(registry): State<Arc<RoomRegistry>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "rooms": registry.room_count(),
        "connections": registry.connection_count(),
    }))
}
