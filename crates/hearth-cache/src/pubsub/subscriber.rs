//! Redis pub/sub subscriber
//!
//! Holds one dedicated pub/sub connection per process, fans received
//! messages into a tokio broadcast channel, and reconnects with a delay
//! after connection loss. Subscription changes arrive over a control
//! channel because the message stream borrows the connection.

use futures_util::StreamExt;
use redis::Client;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};

use crate::pubsub::{ChannelEvent, GroupChannel};

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to parse event: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Subscriber control channel closed")]
    ControlClosed,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// A message received from pub/sub
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// Channel the message arrived on
    pub channel: GroupChannel,
    /// Parsed event, when the payload was a valid `ChannelEvent`
    pub event: Option<ChannelEvent>,
}

impl ReceivedMessage {
    fn from_wire(channel_name: &str, payload: &str) -> Self {
        Self {
            channel: GroupChannel::parse(channel_name),
            event: serde_json::from_str(payload).ok(),
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Broadcast fan-in buffer size
    pub broadcast_buffer: usize,
    /// Delay before reconnecting after an error, in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

enum Command {
    Subscribe(Vec<String>),
    Unsubscribe(Vec<String>),
    Shutdown,
}

/// Redis pub/sub subscriber
pub struct Subscriber {
    subscribed: Arc<RwLock<HashSet<String>>>,
    broadcast_tx: broadcast::Sender<ReceivedMessage>,
    control_tx: mpsc::Sender<Command>,
}

impl Subscriber {
    /// Create a subscriber and spawn its background listener
    pub fn spawn(config: SubscriberConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (control_tx, control_rx) = mpsc::channel(32);
        let subscribed = Arc::new(RwLock::new(HashSet::new()));

        tokio::spawn(listener_loop(
            config,
            subscribed.clone(),
            broadcast_tx.clone(),
            control_rx,
        ));

        Self {
            subscribed,
            broadcast_tx,
            control_tx,
        }
    }

    /// Subscribe to channels
    pub async fn subscribe(&self, channels: &[GroupChannel]) -> SubscriberResult<()> {
        let names = channels.iter().map(GroupChannel::name).collect();
        self.control_tx
            .send(Command::Subscribe(names))
            .await
            .map_err(|_| SubscriberError::ControlClosed)
    }

    /// Unsubscribe from channels
    pub async fn unsubscribe(&self, channels: &[GroupChannel]) -> SubscriberResult<()> {
        let names = channels.iter().map(GroupChannel::name).collect();
        self.control_tx
            .send(Command::Unsubscribe(names))
            .await
            .map_err(|_| SubscriberError::ControlClosed)
    }

    /// Get a receiver for incoming messages
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ReceivedMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Channels currently subscribed to
    pub async fn subscribed_channels(&self) -> Vec<String> {
        self.subscribed.read().await.iter().cloned().collect()
    }

    /// Shut down the background listener
    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.control_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| SubscriberError::ControlClosed)
    }
}

async fn listener_loop(
    config: SubscriberConfig,
    subscribed: Arc<RwLock<HashSet<String>>>,
    broadcast_tx: broadcast::Sender<ReceivedMessage>,
    mut control_rx: mpsc::Receiver<Command>,
) {
    loop {
        match run_connection(&config, &subscribed, &broadcast_tx, &mut control_rx).await {
            Ok(true) => {
                tracing::info!("Subscriber shutting down");
                break;
            }
            Ok(false) => {
                tracing::warn!("Pub/sub stream ended, reconnecting");
            }
            Err(e) => {
                tracing::error!(error = %e, "Subscriber error, reconnecting");
            }
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(config.reconnect_delay_ms)).await;
    }
}

/// Run one connection until shutdown (Ok(true)), stream end (Ok(false)),
/// or error.
async fn run_connection(
    config: &SubscriberConfig,
    subscribed: &Arc<RwLock<HashSet<String>>>,
    broadcast_tx: &broadcast::Sender<ReceivedMessage>,
    control_rx: &mut mpsc::Receiver<Command>,
) -> SubscriberResult<bool> {
    let client = Client::open(config.redis_url.as_str())?;
    let mut pubsub = client.get_async_pubsub().await?;

    // Re-establish subscriptions carried over from before a reconnect
    for channel in subscribed.read().await.iter() {
        pubsub.subscribe(channel).await?;
    }

    tracing::info!("Subscriber connected to Redis");

    let mut stream = pubsub.on_message();

    loop {
        tokio::select! {
            msg = stream.next() => {
                let Some(msg) = msg else {
                    return Ok(false);
                };

                let channel_name = msg.get_channel_name().to_string();
                let payload: String = msg.get_payload().unwrap_or_default();

                // Send errors mean no receivers, which is fine
                let _ = broadcast_tx.send(ReceivedMessage::from_wire(&channel_name, &payload));
            }

            cmd = control_rx.recv() => {
                match cmd {
                    Some(Command::Subscribe(channels)) => {
                        // The stream borrows the connection; drop it to subscribe
                        drop(stream);
                        for channel in &channels {
                            match pubsub.subscribe(channel).await {
                                Ok(()) => {
                                    subscribed.write().await.insert(channel.clone());
                                    tracing::debug!(channel = %channel, "Subscribed");
                                }
                                Err(e) => {
                                    tracing::error!(channel = %channel, error = %e, "Subscribe failed");
                                }
                            }
                        }
                        stream = pubsub.on_message();
                    }
                    Some(Command::Unsubscribe(channels)) => {
                        drop(stream);
                        for channel in &channels {
                            match pubsub.unsubscribe(channel).await {
                                Ok(()) => {
                                    subscribed.write().await.remove(channel);
                                    tracing::debug!(channel = %channel, "Unsubscribed");
                                }
                                Err(e) => {
                                    tracing::error!(channel = %channel, error = %e, "Unsubscribe failed");
                                }
                            }
                        }
                        stream = pubsub.on_message();
                    }
                    Some(Command::Shutdown) | None => return Ok(true),
                }
            }
        }
    }
}

/// Builder for a subscriber with initial subscriptions
pub struct SubscriberBuilder {
    config: SubscriberConfig,
    initial: Vec<GroupChannel>,
}

impl SubscriberBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SubscriberConfig::default(),
            initial: Vec::new(),
        }
    }

    /// Set the Redis URL
    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = url.into();
        self
    }

    /// Set the broadcast buffer size
    #[must_use]
    pub fn broadcast_buffer(mut self, size: usize) -> Self {
        self.config.broadcast_buffer = size;
        self
    }

    /// Set the reconnect delay
    #[must_use]
    pub fn reconnect_delay_ms(mut self, delay: u64) -> Self {
        self.config.reconnect_delay_ms = delay;
        self
    }

    /// Add an initial subscription
    #[must_use]
    pub fn subscribe(mut self, channel: GroupChannel) -> Self {
        self.initial.push(channel);
        self
    }

    /// Spawn the subscriber
    pub async fn build(self) -> SubscriberResult<Subscriber> {
        let subscriber = Subscriber::spawn(self.config);
        if !self.initial.is_empty() {
            subscriber.subscribe(&self.initial).await?;
        }
        Ok(subscriber)
    }
}

impl Default for SubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::Snowflake;

    #[test]
    fn test_received_message_parses_event() {
        let payload = r#"{"action":"new_message","results":{"id":"1"}}"#;
        let msg = ReceivedMessage::from_wire("room:42", payload);

        assert_eq!(msg.channel, GroupChannel::Room(Snowflake::new(42)));
        assert!(msg.event.is_some());
    }

    #[test]
    fn test_received_message_invalid_payload() {
        let msg = ReceivedMessage::from_wire("user:7", "garbage");
        assert_eq!(msg.channel, GroupChannel::User(Snowflake::new(7)));
        assert!(msg.event.is_none());
    }

    #[test]
    fn test_builder_accumulates_settings() {
        let builder = SubscriberBuilder::new()
            .redis_url("redis://localhost:6390")
            .broadcast_buffer(256)
            .reconnect_delay_ms(250)
            .subscribe(GroupChannel::broadcast());

        assert_eq!(builder.config.redis_url, "redis://localhost:6390");
        assert_eq!(builder.config.broadcast_buffer, 256);
        assert_eq!(builder.config.reconnect_delay_ms, 250);
        assert_eq!(builder.initial.len(), 1);
    }
}
