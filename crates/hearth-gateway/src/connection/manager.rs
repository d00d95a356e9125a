//! Connection registry
//!
//! Tracks which connections belong to which user and which room, and
//! delivers group-addressed frames. DashMap keeps the maps concurrent
//! without a global lock.

use dashmap::DashMap;
use hearth_core::Snowflake;
use std::collections::HashSet;
use std::sync::Arc;

use super::Connection;
use crate::protocol::OutboundFrame;

/// Registry of all live connections
pub struct ConnectionManager {
    /// Connections by session ID
    connections: DashMap<String, Arc<Connection>>,
    /// User ID to session IDs
    user_sessions: DashMap<Snowflake, HashSet<String>>,
    /// Room ID to session IDs
    room_sessions: DashMap<Snowflake, HashSet<String>>,
}

impl ConnectionManager {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_sessions: DashMap::new(),
            room_sessions: DashMap::new(),
        }
    }

    /// Admit an authenticated connection.
    ///
    /// Admission alone joins no groups: presence connections additionally
    /// call `join_user_group`, chat connections `join_room`. Personal
    /// notifications therefore reach only presence connections, and room
    /// broadcasts only chat connections.
    pub fn admit(&self, connection: Arc<Connection>) {
        let session_id = connection.session_id().to_string();
        self.connections.insert(session_id.clone(), connection);

        tracing::debug!(session_id = %session_id, "Connection admitted");
    }

    /// Join a connection to its user's personal group
    pub fn join_user_group(&self, session_id: &str) {
        if let Some(connection) = self.connections.get(session_id) {
            self.user_sessions
                .entry(connection.user_id())
                .or_default()
                .insert(session_id.to_string());
        }
    }

    /// Drop a connection and every index entry pointing at it
    pub fn remove(&self, session_id: &str) {
        let Some((_, connection)) = self.connections.remove(session_id) else {
            return;
        };

        self.user_sessions
            .alter(&connection.user_id(), |_, mut sessions| {
                sessions.remove(session_id);
                sessions
            });
        self.user_sessions.retain(|_, sessions| !sessions.is_empty());

        for room_id in connection.rooms() {
            self.room_sessions.alter(&room_id, |_, mut sessions| {
                sessions.remove(session_id);
                sessions
            });
        }
        self.room_sessions.retain(|_, sessions| !sessions.is_empty());

        tracing::debug!(session_id = %session_id, "Connection removed");
    }

    /// Join a connection to a room group
    pub fn join_room(&self, session_id: &str, room_id: Snowflake) {
        if let Some(connection) = self.connections.get(session_id) {
            connection.join_room(room_id);
            self.room_sessions
                .entry(room_id)
                .or_default()
                .insert(session_id.to_string());
        }
    }

    /// Remove a connection from a room group
    pub fn leave_room(&self, session_id: &str, room_id: Snowflake) {
        if let Some(connection) = self.connections.get(session_id) {
            connection.leave_room(room_id);
        }
        self.room_sessions.alter(&room_id, |_, mut sessions| {
            sessions.remove(session_id);
            sessions
        });
        self.room_sessions.retain(|_, sessions| !sessions.is_empty());
    }

    /// Deliver a frame to every connection of a user; returns the number
    /// of queues that accepted it
    pub fn send_to_user(&self, user_id: Snowflake, frame: &OutboundFrame) -> usize {
        let Some(sessions) = self.user_sessions.get(&user_id) else {
            return 0;
        };

        sessions
            .iter()
            .filter_map(|sid| self.connections.get(sid))
            .filter(|conn| conn.send(frame.clone()))
            .count()
    }

    /// Deliver a frame to every connection joined to a room, optionally
    /// skipping one user's connections
    pub fn send_to_room(
        &self,
        room_id: Snowflake,
        frame: &OutboundFrame,
        exclude_user: Option<Snowflake>,
    ) -> usize {
        let Some(sessions) = self.room_sessions.get(&room_id) else {
            return 0;
        };

        sessions
            .iter()
            .filter_map(|sid| self.connections.get(sid))
            .filter(|conn| Some(conn.user_id()) != exclude_user)
            .filter(|conn| conn.send(frame.clone()))
            .count()
    }

    /// Deliver a frame to every live connection
    pub fn broadcast(&self, frame: &OutboundFrame) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.send(frame.clone()))
            .count()
    }

    /// Number of live presence connections for a user
    pub fn user_connection_count(&self, user_id: Snowflake) -> usize {
        self.user_sessions
            .get(&user_id)
            .map_or(0, |sessions| sessions.len())
    }

    /// Number of connections joined to a room
    pub fn room_connection_count(&self, room_id: Snowflake) -> usize {
        self.room_sessions
            .get(&room_id)
            .map_or(0, |sessions| sessions.len())
    }

    /// Total live connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("users", &self.user_sessions.len())
            .field("rooms", &self.room_sessions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::EventKind;
    use tokio::sync::mpsc;

    fn connect(
        manager: &ConnectionManager,
        user_id: i64,
    ) -> (Arc<Connection>, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(16);
        let conn = Arc::new(Connection::new(Snowflake::new(user_id), tx));
        manager.admit(conn.clone());
        manager.join_user_group(conn.session_id());
        (conn, rx)
    }

    fn frame() -> OutboundFrame {
        OutboundFrame::new(EventKind::NewMessage, serde_json::json!({"id": "1"}))
    }

    #[test]
    fn test_admit_and_remove() {
        let manager = ConnectionManager::new();
        let (conn, _rx) = connect(&manager, 1);

        assert_eq!(manager.connection_count(), 1);
        assert_eq!(manager.user_connection_count(Snowflake::new(1)), 1);

        manager.remove(conn.session_id());
        assert_eq!(manager.connection_count(), 0);
        assert_eq!(manager.user_connection_count(Snowflake::new(1)), 0);
    }

    #[test]
    fn test_send_to_user_reaches_all_sessions() {
        let manager = ConnectionManager::new();
        let (_c1, mut rx1) = connect(&manager, 1);
        let (_c2, mut rx2) = connect(&manager, 1);
        let (_c3, mut rx3) = connect(&manager, 2);

        let sent = manager.send_to_user(Snowflake::new(1), &frame());
        assert_eq!(sent, 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        assert!(rx3.try_recv().is_err());
    }

    #[test]
    fn test_user_events_skip_chat_only_connections() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::channel(16);
        let conn = Arc::new(Connection::new(Snowflake::new(1), tx));

        // Admitted and joined to a room, but never to the user group
        manager.admit(conn.clone());
        manager.join_room(conn.session_id(), Snowflake::new(50));

        assert_eq!(manager.send_to_user(Snowflake::new(1), &frame()), 0);
        assert!(rx.try_recv().is_err());
        assert_eq!(manager.send_to_room(Snowflake::new(50), &frame(), None), 1);
    }

    #[test]
    fn test_send_to_room_excludes_user() {
        let manager = ConnectionManager::new();
        let (c1, mut rx1) = connect(&manager, 1);
        let (c2, mut rx2) = connect(&manager, 2);

        let room = Snowflake::new(99);
        manager.join_room(c1.session_id(), room);
        manager.join_room(c2.session_id(), room);

        let sent = manager.send_to_room(room, &frame(), Some(Snowflake::new(1)));
        assert_eq!(sent, 1);
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_leave_room_stops_delivery() {
        let manager = ConnectionManager::new();
        let (c1, mut rx1) = connect(&manager, 1);

        let room = Snowflake::new(5);
        manager.join_room(c1.session_id(), room);
        assert_eq!(manager.room_connection_count(room), 1);

        manager.leave_room(c1.session_id(), room);
        assert_eq!(manager.room_connection_count(room), 0);
        assert_eq!(manager.send_to_room(room, &frame(), None), 0);
        assert!(rx1.try_recv().is_err());
    }

    #[test]
    fn test_remove_cleans_room_index() {
        let manager = ConnectionManager::new();
        let (c1, _rx1) = connect(&manager, 1);

        let room = Snowflake::new(5);
        manager.join_room(c1.session_id(), room);
        manager.remove(c1.session_id());

        assert_eq!(manager.room_connection_count(room), 0);
    }
}
