//! Domain entities - core business objects

mod family;
mod friendship;
mod message;
mod room;
mod user;
mod video_call;

pub use family::{generate_invite_code, Family, FamilyMember};
pub use friendship::{Friendship, FriendshipStatus};
pub use message::{Message, MessageMedia};
pub use room::{Room, RoomType};
pub use user::User;
pub use video_call::{CallStatus, IceServer, VideoCall};
