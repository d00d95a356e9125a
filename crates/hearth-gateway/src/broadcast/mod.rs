//! Pub/sub to socket bridging

mod dispatcher;

pub use dispatcher::{EventDispatcher, EventDispatcherConfig};
