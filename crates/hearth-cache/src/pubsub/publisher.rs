//! Redis pub/sub publisher
//!
//! Services publish `ChannelEvent`s here; the gateway's dispatcher turns
//! them into socket frames. Delivery is fire-and-forget: a disconnected
//! recipient simply misses the event.

use hearth_core::{EventKind, Snowflake};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::GroupChannel;

/// Event carried over a pub/sub channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEvent {
    /// Action tag, forwarded verbatim into the client envelope
    pub action: EventKind,
    /// Payload, forwarded as the envelope's `results`
    pub results: serde_json::Value,
    /// Connections of this user do not receive the event (used to keep a
    /// sender from echoing back to itself)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_user: Option<Snowflake>,
}

impl ChannelEvent {
    /// Create a new event
    #[must_use]
    pub fn new(action: EventKind, results: serde_json::Value) -> Self {
        Self {
            action,
            results,
            exclude_user: None,
        }
    }

    /// Exclude one user's connections from delivery
    #[must_use]
    pub fn excluding(mut self, user_id: Snowflake) -> Self {
        self.exclude_user = Some(user_id);
        self
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Redis pub/sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event to a channel, returning the subscriber count
    pub async fn publish(&self, channel: &GroupChannel, event: &ChannelEvent) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let channel_name = channel.name();
        let payload = event.to_json()?;

        let receivers: u32 = conn.publish(&channel_name, &payload).await?;

        tracing::debug!(
            channel = %channel_name,
            action = %event.action,
            receivers = receivers,
            "Published event"
        );

        Ok(receivers)
    }

    /// Publish an event to a room's participants
    pub async fn publish_to_room(
        &self,
        room_id: Snowflake,
        event: &ChannelEvent,
    ) -> RedisResult<u32> {
        self.publish(&GroupChannel::room(room_id), event).await
    }

    /// Publish an event to all of one user's connections
    pub async fn publish_to_user(
        &self,
        user_id: Snowflake,
        event: &ChannelEvent,
    ) -> RedisResult<u32> {
        self.publish(&GroupChannel::user(user_id), event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_serialization() {
        let event = ChannelEvent::new(EventKind::NewMessage, json!({"id": "1"}));
        let payload = event.to_json().unwrap();
        assert!(payload.contains("new_message"));
        assert!(!payload.contains("exclude_user"));
    }

    #[test]
    fn test_event_excluding_user() {
        let event =
            ChannelEvent::new(EventKind::NewMessage, json!({})).excluding(Snowflake::new(9));
        assert_eq!(event.exclude_user, Some(Snowflake::new(9)));

        let payload = event.to_json().unwrap();
        let parsed: ChannelEvent = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed.exclude_user, Some(Snowflake::new(9)));
    }
}
