//! # hearth-cache
//!
//! Redis layer: connection pooling and the pub/sub plumbing that carries
//! events from the services to the gateway.

pub mod pool;
pub mod pubsub;

pub use pool::{CacheError, RedisPool, RedisPoolConfig, RedisResult, SharedRedisPool};
pub use pubsub::{
    ChannelEvent, GroupChannel, Publisher, ReceivedMessage, Subscriber, SubscriberBuilder,
    SubscriberConfig, SubscriberError, SubscriberResult,
};
