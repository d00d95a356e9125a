//! Pub/Sub channel naming
//!
//! Three channel families exist: `room:<id>` carries everything addressed
//! to a room's participants, `user:<id>` carries personal notifications,
//! and `broadcast` reaches every connected client.

use hearth_core::Snowflake;

/// Channel prefix for room events
pub const ROOM_CHANNEL_PREFIX: &str = "room:";
/// Channel prefix for per-user events
pub const USER_CHANNEL_PREFIX: &str = "user:";
/// Channel for events addressed to everyone
pub const BROADCAST_CHANNEL: &str = "broadcast";

/// A pub/sub group address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupChannel {
    /// Events for a specific room (all participants)
    Room(Snowflake),
    /// Events for a specific user (all their connections)
    User(Snowflake),
    /// Events for all connected clients
    Broadcast,
    /// Anything else seen on the wire
    Other(String),
}

impl GroupChannel {
    /// Create a room channel
    #[must_use]
    pub fn room(room_id: Snowflake) -> Self {
        Self::Room(room_id)
    }

    /// Create a user channel
    #[must_use]
    pub fn user(user_id: Snowflake) -> Self {
        Self::User(user_id)
    }

    /// Create the broadcast channel
    #[must_use]
    pub fn broadcast() -> Self {
        Self::Broadcast
    }

    /// The Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Room(id) => format!("{ROOM_CHANNEL_PREFIX}{id}"),
            Self::User(id) => format!("{USER_CHANNEL_PREFIX}{id}"),
            Self::Broadcast => BROADCAST_CHANNEL.to_string(),
            Self::Other(name) => name.clone(),
        }
    }

    /// Parse a channel name back into a `GroupChannel`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name == BROADCAST_CHANNEL {
            return Self::Broadcast;
        }

        if let Some(id) = name
            .strip_prefix(ROOM_CHANNEL_PREFIX)
            .and_then(|s| s.parse::<i64>().ok())
        {
            return Self::Room(Snowflake::new(id));
        }

        if let Some(id) = name
            .strip_prefix(USER_CHANNEL_PREFIX)
            .and_then(|s| s.parse::<i64>().ok())
        {
            return Self::User(Snowflake::new(id));
        }

        Self::Other(name.to_string())
    }
}

impl std::fmt::Display for GroupChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(GroupChannel::room(Snowflake::new(42)).name(), "room:42");
        assert_eq!(GroupChannel::user(Snowflake::new(7)).name(), "user:7");
        assert_eq!(GroupChannel::broadcast().name(), "broadcast");
    }

    #[test]
    fn test_channel_parse_roundtrip() {
        for channel in [
            GroupChannel::room(Snowflake::new(42)),
            GroupChannel::user(Snowflake::new(7)),
            GroupChannel::broadcast(),
        ] {
            assert_eq!(GroupChannel::parse(&channel.name()), channel);
        }
    }

    #[test]
    fn test_unknown_channel_parses_as_other() {
        assert_eq!(
            GroupChannel::parse("metrics:1"),
            GroupChannel::Other("metrics:1".to_string())
        );
        // Prefix without a numeric ID is not a room channel
        assert_eq!(
            GroupChannel::parse("room:abc"),
            GroupChannel::Other("room:abc".to_string())
        );
    }
}
