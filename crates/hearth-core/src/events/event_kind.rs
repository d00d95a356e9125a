//! Event kind - the closed set of action tags carried on the wire
//!
//! Every payload pushed to a client carries one of these tags in its
//! `action` field. Keeping the set closed here means a publish site cannot
//! invent a tag the gateway does not know about.

use serde::{Deserialize, Serialize};

/// Outbound event tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A message was created in a room
    NewMessage,
    /// A message was edited
    EditMessage,
    /// A message was removed from a room
    DeleteMessage,
    /// Read receipts changed on one or more messages
    ReadMessages,
    /// A participant started typing (ephemeral)
    Typing,
    /// A participant stopped typing (ephemeral)
    StopTyping,
    /// Initial history push after joining a chat channel
    PullHistory,
    /// Room list push on the presence channel
    PullRooms,
    /// A single room pushed after get-or-create
    SingleRoom,
    /// A friend request arrived or changed state
    FriendRequest,
    /// A user's online flag changed
    PresenceUpdate,
    /// An inbound event was rejected; the connection stays open
    Error,
}

impl EventKind {
    /// Wire representation of the tag
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewMessage => "new_message",
            Self::EditMessage => "edit_message",
            Self::DeleteMessage => "delete_message",
            Self::ReadMessages => "read_messages",
            Self::Typing => "typing",
            Self::StopTyping => "stop_typing",
            Self::PullHistory => "pull_history",
            Self::PullRooms => "pull_rooms",
            Self::SingleRoom => "single_room",
            Self::FriendRequest => "friend_request",
            Self::PresenceUpdate => "presence_update",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tags_are_snake_case() {
        assert_eq!(EventKind::NewMessage.as_str(), "new_message");
        assert_eq!(EventKind::StopTyping.as_str(), "stop_typing");
        assert_eq!(EventKind::PullRooms.to_string(), "pull_rooms");
    }

    #[test]
    fn test_serde_matches_as_str() {
        for kind in [
            EventKind::NewMessage,
            EventKind::EditMessage,
            EventKind::DeleteMessage,
            EventKind::ReadMessages,
            EventKind::Typing,
            EventKind::StopTyping,
            EventKind::PullHistory,
            EventKind::PullRooms,
            EventKind::SingleRoom,
            EventKind::FriendRequest,
            EventKind::PresenceUpdate,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
