//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every implementation applies the
//! active-only predicate uniformly: soft-deleted rows (`is_active = false`)
//! are invisible to all queries unless an operation says otherwise.

use async_trait::async_trait;

use crate::entities::{
    Family, FamilyMember, Friendship, FriendshipStatus, IceServer, Message, MessageMedia, Room,
    User, VideoCall,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by email (the login key)
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Check if an email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new user
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Update an existing user
    async fn update(&self, user: &User) -> RepoResult<()>;

    /// Flip the online flag (last write wins under concurrency)
    async fn set_online(&self, id: Snowflake, online: bool) -> RepoResult<()>;

    /// Record the last seen IP address
    async fn set_last_ip(&self, id: Snowflake, ip: &str) -> RepoResult<()>;

    /// Mark the email address verified
    async fn mark_email_verified(&self, id: Snowflake) -> RepoResult<()>;

    /// Soft delete a user
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Friendship Repository
// ============================================================================

#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// Find the active REQUESTED edge `from -> to` (exact direction)
    async fn find_request(&self, from: Snowflake, to: Snowflake) -> RepoResult<Option<Friendship>>;

    /// Find any active edge of the given status between the pair, either direction
    async fn find_between(
        &self,
        a: Snowflake,
        b: Snowflake,
        status: FriendshipStatus,
    ) -> RepoResult<Option<Friendship>>;

    /// Create a new edge
    async fn create(&self, friendship: &Friendship) -> RepoResult<()>;

    /// Persist status / active-flag changes
    async fn update(&self, friendship: &Friendship) -> RepoResult<()>;

    /// Hard delete any ACCEPTED edge between the pair; returns rows removed
    async fn remove_accepted(&self, a: Snowflake, b: Snowflake) -> RepoResult<u64>;

    /// IDs of all active accepted friends of `user`, both directions
    async fn friends_of(&self, user: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// Pending requests addressed to `user`
    async fn incoming_requests(&self, user: Snowflake) -> RepoResult<Vec<Friendship>>;
}

// ============================================================================
// Room Repository
// ============================================================================

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Find room by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>>;

    /// Find the private room between two users, if one exists
    async fn find_private_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Room>>;

    /// Find the system-managed room of a family
    async fn find_by_family(&self, family_id: Snowflake) -> RepoResult<Option<Room>>;

    /// All active rooms the user participates in
    async fn rooms_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Room>>;

    /// Create a room together with its initial participant set.
    ///
    /// For private rooms the storage layer enforces uniqueness of the
    /// unordered participant pair; a concurrent duplicate create fails
    /// with a conflict the caller resolves by re-reading.
    async fn create(&self, room: &Room, participants: &[Snowflake]) -> RepoResult<()>;

    /// Update room columns (title, description, avatar, owner, archived)
    async fn update(&self, room: &Room) -> RepoResult<()>;

    /// Delete a room; messages and their media go with it
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Participant IDs of a room
    async fn participants(&self, room_id: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// Check whether a user participates in a room
    async fn is_participant(&self, room_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Add users to a room (idempotent)
    async fn add_participants(&self, room_id: Snowflake, user_ids: &[Snowflake]) -> RepoResult<()>;

    /// Remove users from a room
    async fn remove_participants(
        &self,
        room_id: Snowflake,
        user_ids: &[Snowflake],
    ) -> RepoResult<()>;

    /// Replace the participant set wholesale (family room sync)
    async fn set_participants(&self, room_id: Snowflake, user_ids: &[Snowflake]) -> RepoResult<()>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Most recent messages in a room, newest first
    async fn recent_in_room(&self, room_id: Snowflake, limit: i64) -> RepoResult<Vec<Message>>;

    /// Persist a message and its media in one transaction.
    ///
    /// Either everything lands or nothing does; a media row failure rolls
    /// the message back too.
    async fn create_with_media(
        &self,
        message: &Message,
        media: &[MessageMedia],
    ) -> RepoResult<()>;

    /// Persist an edit (content + edited_at)
    async fn update(&self, message: &Message) -> RepoResult<()>;

    /// Hard delete a message; media rows cascade
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Media rows of a message
    async fn media_for(&self, message_id: Snowflake) -> RepoResult<Vec<MessageMedia>>;

    /// Add `user` to the message's read set (idempotent)
    async fn mark_read(&self, message_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;

    /// IDs of users who have read the message
    async fn readers(&self, message_id: Snowflake) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// Family Repository
// ============================================================================

#[async_trait]
pub trait FamilyRepository: Send + Sync {
    /// Find family by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Family>>;

    /// Find family by invite code
    async fn find_by_invite_code(&self, code: &str) -> RepoResult<Option<Family>>;

    /// Create a new family
    async fn create(&self, family: &Family) -> RepoResult<()>;

    /// Update family columns (name, avatar, invite code)
    async fn update(&self, family: &Family) -> RepoResult<()>;

    /// Delete a family
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Membership records of a family
    async fn members(&self, family_id: Snowflake) -> RepoResult<Vec<FamilyMember>>;

    /// Member IDs of a family
    async fn member_ids(&self, family_id: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// Check membership
    async fn is_member(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Add a member (fails with a conflict when already present)
    async fn add_member(&self, member: &FamilyMember) -> RepoResult<()>;

    /// Remove a member
    async fn remove_member(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;

    /// Admin IDs of a family
    async fn admin_ids(&self, family_id: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// Check admin status
    async fn is_admin(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Grant admin (idempotent)
    async fn add_admin(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;

    /// Revoke admin
    async fn remove_admin(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Video Call Repository
// ============================================================================

#[async_trait]
pub trait VideoCallRepository: Send + Sync {
    /// Find the call attached to a room
    async fn find_by_room(&self, room_id: Snowflake) -> RepoResult<Option<VideoCall>>;

    /// Create a call record
    async fn create(&self, call: &VideoCall) -> RepoResult<()>;

    /// Persist status / end-time changes
    async fn update(&self, call: &VideoCall) -> RepoResult<()>;

    /// Add a participant to the call (idempotent)
    async fn add_participant(&self, call_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;

    /// Participant IDs of a call
    async fn participants(&self, call_id: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// Active ICE servers ordered by priority
    async fn ice_servers(&self) -> RepoResult<Vec<IceServer>>;
}
