//! Wire protocol

mod envelope;

pub use envelope::{
    ChatClientAction, MessageRef, NewMessagePayload, OutboundFrame, PresenceClientAction,
    ProtocolError,
};
