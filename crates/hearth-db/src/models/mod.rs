//! Database row models
//!
//! Thin `FromRow` structs mirroring table layouts, with conversions into
//! the domain entities.

mod family;
mod friendship;
mod message;
mod room;
mod user;
mod video_call;

pub use family::{FamilyMemberModel, FamilyModel};
pub use friendship::FriendshipModel;
pub use message::{MessageMediaModel, MessageModel};
pub use room::RoomModel;
pub use user::UserModel;
pub use video_call::{IceServerModel, VideoCallModel};
