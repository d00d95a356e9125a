//! A single live WebSocket connection
//!
//! Authentication happens before the upgrade (token query parameter), so
//! a connection knows its user from birth. Outbound frames go through a
//! bounded mpsc channel drained by the socket's writer task.

use hearth_core::Snowflake;
use parking_lot::RwLock;
use std::collections::HashSet;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::OutboundFrame;

/// A live connection
pub struct Connection {
    session_id: String,
    user_id: Snowflake,
    rooms: RwLock<HashSet<Snowflake>>,
    sender: mpsc::Sender<OutboundFrame>,
}

impl Connection {
    /// Create a connection for an authenticated user
    pub fn new(user_id: Snowflake, sender: mpsc::Sender<OutboundFrame>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            user_id,
            rooms: RwLock::new(HashSet::new()),
            sender,
        }
    }

    /// Unique session identifier
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The authenticated user behind this connection
    #[must_use]
    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    /// Rooms this connection has joined
    pub fn rooms(&self) -> Vec<Snowflake> {
        self.rooms.read().iter().copied().collect()
    }

    /// Record a joined room
    pub fn join_room(&self, room_id: Snowflake) {
        self.rooms.write().insert(room_id);
    }

    /// Record a left room
    pub fn leave_room(&self, room_id: Snowflake) {
        self.rooms.write().remove(&room_id);
    }

    /// Queue a frame for delivery.
    ///
    /// Fails when the writer task is gone (socket closed) or the queue is
    /// full; either way the frame is dropped, matching the best-effort
    /// delivery contract.
    pub fn send(&self, frame: OutboundFrame) -> bool {
        self.sender.try_send(frame).is_ok()
    }

    /// Whether the writer side is still alive
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("rooms", &self.rooms.read().len())
            .finish()
    }
}
