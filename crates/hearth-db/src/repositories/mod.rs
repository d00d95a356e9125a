//! PostgreSQL repository implementations

mod error;
mod family;
mod friendship;
mod message;
mod room;
mod user;
mod video_call;

pub use family::PgFamilyRepository;
pub use friendship::PgFriendshipRepository;
pub use message::PgMessageRepository;
pub use room::PgRoomRepository;
pub use user::PgUserRepository;
pub use video_call::PgVideoCallRepository;
