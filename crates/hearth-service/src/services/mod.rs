//! Application services

mod account;
mod context;
mod error;
mod family;
mod friendship;
mod message;
mod permission;
mod presence;
mod read_state;
mod room;
mod video;

pub use account::AccountService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use family::FamilyService;
pub use friendship::FriendshipService;
pub use message::MessageService;
pub use permission::{can_delete, FamilyContext};
pub use presence::PresenceService;
pub use read_state::ReadStateService;
pub use room::RoomService;
pub use video::VideoService;
