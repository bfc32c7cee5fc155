use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;

use agrideal_common::negotiation::NegotiationId;

/// Process-local connection identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(u64);

impl std::fmt::Display for ConnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Outbound frame channel for one connection. The socket's writer task
/// drains it; a closed receiver just means the connection died and its
/// frames are dropped.
pub type FrameSender = mpsc::UnboundedSender<String>;

/// Live room membership: negotiation id to the set of connected clients.
///
/// Volatile by design. Rooms exist only while occupied and are rebuilt from
/// client `join` frames after any restart; the durable store, not this map,
/// is the system of record. One instance per relay process, owned by the
/// router state.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<NegotiationId, HashMap<ConnId, FrameSender>>,
    membership: DashMap<ConnId, NegotiationId>,
    next_conn: AtomicU64,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an identity for a freshly accepted connection.
    pub fn register(&self) -> ConnId {
        ConnId(self.next_conn.fetch_add(1, Ordering::Relaxed))
    }

    /// Put a connection into a room, leaving any previous room first. A
    /// connection belongs to at most one room at a time.
    pub fn join(&self, conn: ConnId, tx: FrameSender, room: NegotiationId) {
        self.leave(conn);
        self.rooms.entry(room.clone()).or_default().insert(conn, tx);
        self.membership.insert(conn, room);
    }

    /// Remove a connection from its room, dropping the room once empty.
    /// Called on explicit re-join and on socket close.
    pub fn leave(&self, conn: ConnId) {
        let Some((_, room)) = self.membership.remove(&conn) else {
            return;
        };
        if let Some(mut members) = self.rooms.get_mut(&room) {
            members.remove(&conn);
            if members.is_empty() {
                drop(members);
                self.rooms.remove_if(&room, |_, m| m.is_empty());
            }
        }
    }

    /// Deliver a frame to every member of the sender's room except the
    /// sender. Closed channels are skipped; their connections get reaped
    /// by their own close handling. Returns the number of receivers.
    pub fn broadcast_from(&self, sender: ConnId, frame: &str) -> usize {
        let Some(room) = self.membership.get(&sender).map(|r| r.clone()) else {
            return 0;
        };
        let Some(members) = self.rooms.get(&room) else {
            return 0;
        };
        let mut delivered = 0;
        for (conn, tx) in members.iter() {
            if *conn == sender {
                continue;
            }
            if tx.send(frame.to_string()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn connection_count(&self) -> usize {
        self.membership.len()
    }
}
