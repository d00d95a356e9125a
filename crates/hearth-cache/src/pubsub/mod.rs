//! Redis pub/sub plumbing

mod channels;
mod publisher;
mod subscriber;

pub use channels::GroupChannel;
pub use publisher::{ChannelEvent, Publisher};
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    SubscriberResult,
};
