//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Room not found: {0}")]
    RoomNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Family not found: {0}")]
    FamilyNotFound(Snowflake),

    #[error("Friend request not found")]
    FriendRequestNotFound,

    #[error("Video call not found for room: {0}")]
    CallNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Cannot send a friend request to yourself")]
    SelfFriendRequest,

    #[error("Cannot open a private room with yourself")]
    SelfPrivateRoom,

    #[error("Message content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Invalid invite code")]
    InviteCodeInvalid,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a participant of this room")]
    NotParticipant,

    #[error("Not the creator of this room")]
    NotRoomCreator,

    #[error("Not allowed to delete this message")]
    DeleteForbidden,

    #[error("Only the author can edit a message")]
    NotMessageAuthor,

    #[error("Family admin rights required")]
    NotFamilyAdmin,

    #[error("Not a member of this family")]
    NotFamilyMember,

    #[error("Not the creator of this family")]
    NotFamilyCreator,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Friend request already exists")]
    FriendRequestExists,

    #[error("Already friends with this user")]
    AlreadyFriends,

    #[error("Already a member of this family")]
    AlreadyFamilyMember,

    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("A private room already exists for this pair")]
    PrivateRoomExists,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Room creator cannot be removed from the room")]
    CannotRemoveCreator,

    #[error("Transfer ownership before leaving an owned room")]
    CannotLeaveOwnedRoom,

    #[error("New owner must already be a participant")]
    OwnerNotParticipant,

    #[error("Family rooms are managed automatically")]
    FamilyRoomIsManaged,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::RoomNotFound(_) => "UNKNOWN_ROOM",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::FamilyNotFound(_) => "UNKNOWN_FAMILY",
            Self::FriendRequestNotFound => "UNKNOWN_FRIEND_REQUEST",
            Self::CallNotFound(_) => "UNKNOWN_CALL",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::SelfFriendRequest => "SELF_FRIEND_REQUEST",
            Self::SelfPrivateRoom => "SELF_PRIVATE_ROOM",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::InviteCodeInvalid => "INVALID_INVITE_CODE",

            // Authorization
            Self::NotParticipant => "NOT_PARTICIPANT",
            Self::NotRoomCreator => "NOT_ROOM_CREATOR",
            Self::DeleteForbidden => "DELETE_FORBIDDEN",
            Self::NotMessageAuthor => "NOT_MESSAGE_AUTHOR",
            Self::NotFamilyAdmin => "NOT_FAMILY_ADMIN",
            Self::NotFamilyMember => "NOT_FAMILY_MEMBER",
            Self::NotFamilyCreator => "NOT_FAMILY_CREATOR",

            // Conflict
            Self::FriendRequestExists => "FRIEND_REQUEST_EXISTS",
            Self::AlreadyFriends => "ALREADY_FRIENDS",
            Self::AlreadyFamilyMember => "ALREADY_FAMILY_MEMBER",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::PrivateRoomExists => "PRIVATE_ROOM_EXISTS",

            // Business Rules
            Self::CannotRemoveCreator => "CANNOT_REMOVE_CREATOR",
            Self::CannotLeaveOwnedRoom => "CANNOT_LEAVE_OWNED_ROOM",
            Self::OwnerNotParticipant => "OWNER_NOT_PARTICIPANT",
            Self::FamilyRoomIsManaged => "FAMILY_ROOM_IS_MANAGED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::RoomNotFound(_)
                | Self::MessageNotFound(_)
                | Self::FamilyNotFound(_)
                | Self::FriendRequestNotFound
                | Self::CallNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::SelfFriendRequest
                | Self::SelfPrivateRoom
                | Self::ContentTooLong { .. }
                | Self::InviteCodeInvalid
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotParticipant
                | Self::NotRoomCreator
                | Self::DeleteForbidden
                | Self::NotMessageAuthor
                | Self::NotFamilyAdmin
                | Self::NotFamilyMember
                | Self::NotFamilyCreator
                | Self::CannotRemoveCreator
                | Self::CannotLeaveOwnedRoom
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::FriendRequestExists
                | Self::AlreadyFriends
                | Self::AlreadyFamilyMember
                | Self::EmailAlreadyExists
                | Self::PrivateRoomExists
        )
    }
}
