//! Inbound event handlers, one module per channel

mod chat;
mod presence;

pub use chat::handle_chat_frame;
pub use presence::{handle_presence_frame, push_room_list};
