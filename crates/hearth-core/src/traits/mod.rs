//! Repository traits (ports)

mod repositories;

pub use repositories::{
    FamilyRepository, FriendshipRepository, MessageRepository, RepoResult, RoomRepository,
    UserRepository, VideoCallRepository,
};
