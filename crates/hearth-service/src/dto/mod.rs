//! Request and response DTOs

mod requests;
mod responses;

pub use requests::{
    AddFamilyMemberRequest, AddParticipantsRequest, CreateFamilyRequest, CreateGroupRequest,
    EditMessageRequest, JoinFamilyRequest, MarkReadRequest, MediaUpload,
    RemoveParticipantsRequest, SendMessageRequest, TransferOwnershipRequest,
    UpdateProfileRequest, UpdateRoomRequest, MAX_MESSAGE_LEN,
};
pub use responses::{
    FamilyResponse, FriendshipResponse, MessageMediaResponse, MessageResponse, RoomResponse,
    UserResponse, VideoJoinResponse,
};
