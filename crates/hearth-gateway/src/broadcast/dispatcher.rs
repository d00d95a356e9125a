//! Event dispatcher
//!
//! Receives events from Redis pub/sub and forwards them to the right
//! connections. The gateway subscribes to `room:<id>` and `user:<id>`
//! channels as connections join, and to `broadcast` always.

use hearth_cache::{ChannelEvent, GroupChannel, ReceivedMessage, Subscriber, SubscriberBuilder};
use hearth_core::Snowflake;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::connection::ConnectionManager;
use crate::protocol::OutboundFrame;

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct EventDispatcherConfig {
    /// Redis URL
    pub redis_url: String,
    /// Fan-in buffer size
    pub broadcast_buffer: usize,
    /// Reconnect delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for EventDispatcherConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

/// Routes pub/sub events to live connections
pub struct EventDispatcher {
    connection_manager: Arc<ConnectionManager>,
    subscriber: Subscriber,
    running: AtomicBool,
}

impl EventDispatcher {
    /// Create a dispatcher subscribed to the broadcast channel
    pub async fn new(
        config: EventDispatcherConfig,
        connection_manager: Arc<ConnectionManager>,
    ) -> Result<Self, hearth_cache::SubscriberError> {
        let subscriber = SubscriberBuilder::new()
            .redis_url(&config.redis_url)
            .broadcast_buffer(config.broadcast_buffer)
            .reconnect_delay_ms(config.reconnect_delay_ms)
            .subscribe(GroupChannel::broadcast())
            .build()
            .await?;

        Ok(Self {
            connection_manager,
            subscriber,
            running: AtomicBool::new(false),
        })
    }

    /// Start following a room's channel
    pub async fn watch_room(&self, room_id: Snowflake) {
        self.subscriber
            .subscribe(&[GroupChannel::room(room_id)])
            .await
            .ok();
    }

    /// Stop following a room's channel (no connection is joined anymore)
    pub async fn unwatch_room(&self, room_id: Snowflake) {
        self.subscriber
            .unsubscribe(&[GroupChannel::room(room_id)])
            .await
            .ok();
    }

    /// Start following a user's channel
    pub async fn watch_user(&self, user_id: Snowflake) {
        self.subscriber
            .subscribe(&[GroupChannel::user(user_id)])
            .await
            .ok();
    }

    /// Stop following a user's channel
    pub async fn unwatch_user(&self, user_id: Snowflake) {
        self.subscriber
            .unsubscribe(&[GroupChannel::user(user_id)])
            .await
            .ok();
    }

    /// Spawn the dispatch loop
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Event dispatcher already running");
            return;
        }

        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            dispatcher.run().await;
        });

        tracing::info!("Event dispatcher started");
    }

    /// Stop the dispatch loop and the subscriber
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.subscriber.shutdown().await.ok();
    }

    async fn run(&self) {
        let mut receiver = self.subscriber.receiver();

        while self.running.load(Ordering::SeqCst) {
            match receiver.recv().await {
                Ok(msg) => self.route(msg),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "Dispatcher fell behind, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Event dispatcher stopped");
    }

    fn route(&self, msg: ReceivedMessage) {
        let Some(event) = msg.event else {
            tracing::debug!(channel = %msg.channel, "Non-event payload ignored");
            return;
        };

        let frame = frame_of(&event);

        match msg.channel {
            GroupChannel::Room(room_id) => {
                let sent =
                    self.connection_manager
                        .send_to_room(room_id, &frame, event.exclude_user);
                tracing::trace!(room_id = %room_id, action = %event.action, sent, "Room event dispatched");
            }
            GroupChannel::User(user_id) => {
                let sent = self.connection_manager.send_to_user(user_id, &frame);
                tracing::trace!(user_id = %user_id, action = %event.action, sent, "User event dispatched");
            }
            GroupChannel::Broadcast => {
                let sent = self.connection_manager.broadcast(&frame);
                tracing::trace!(action = %event.action, sent, "Broadcast event dispatched");
            }
            GroupChannel::Other(name) => {
                tracing::debug!(channel = %name, "Event on unknown channel ignored");
            }
        }
    }
}

fn frame_of(event: &ChannelEvent) -> OutboundFrame {
    OutboundFrame::new(event.action, event.results.clone())
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("running", &self.running.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::EventKind;

    #[test]
    fn test_frame_preserves_action_and_payload() {
        let event = ChannelEvent::new(EventKind::NewMessage, serde_json::json!({"id": "7"}));
        let frame = frame_of(&event);
        assert_eq!(frame.action, EventKind::NewMessage);
        assert_eq!(frame.results["id"], "7");
    }

    #[test]
    fn test_config_defaults() {
        let config = EventDispatcherConfig::default();
        assert_eq!(config.broadcast_buffer, 1024);
        assert_eq!(config.reconnect_delay_ms, 1000);
    }
}
