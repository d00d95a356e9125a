//! # hearth-service
//!
//! Application layer: the services implementing friendship, rooms,
//! messages, read state, presence, families, and video calls over the
//! repository ports.

pub mod dto;
pub mod services;

pub use dto::{
    AddFamilyMemberRequest, AddParticipantsRequest, CreateFamilyRequest, CreateGroupRequest,
    EditMessageRequest, FamilyResponse, FriendshipResponse, JoinFamilyRequest, MarkReadRequest,
    MediaUpload, MessageMediaResponse, MessageResponse, RemoveParticipantsRequest, RoomResponse,
    SendMessageRequest, TransferOwnershipRequest, UpdateProfileRequest, UpdateRoomRequest,
    UserResponse, VideoJoinResponse,
};
pub use services::{
    AccountService, FamilyService, FriendshipService, MessageService, PresenceService,
    ReadStateService, RoomService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, VideoService,
};
