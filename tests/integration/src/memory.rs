//! In-memory repository implementations
//!
//! Mirror the semantics of the PostgreSQL repositories closely enough for
//! service-level tests: active-only filtering, the unordered-pair
//! uniqueness of private rooms, and idempotent set inserts.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;

use hearth_core::traits::{
    FamilyRepository, FriendshipRepository, MessageRepository, RepoResult, RoomRepository,
    UserRepository, VideoCallRepository,
};
use hearth_core::{
    DomainError, Family, FamilyMember, Friendship, FriendshipStatus, IceServer, Message,
    MessageMedia, Room, RoomType, Snowflake, User, VideoCall,
};

// ============================================================================
// Users
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Snowflake, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.users.lock().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.users.lock().values().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.users.lock().values().any(|u| u.email == email))
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.lock();
        if users.values().any(|u| u.email == user.email) {
            return Err(DomainError::EmailAlreadyExists);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.lock();
        if !users.contains_key(&user.id) {
            return Err(DomainError::UserNotFound(user.id));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn set_online(&self, id: Snowflake, online: bool) -> RepoResult<()> {
        if let Some(user) = self.users.lock().get_mut(&id) {
            user.is_online = online;
        }
        Ok(())
    }

    async fn set_last_ip(&self, id: Snowflake, ip: &str) -> RepoResult<()> {
        if let Some(user) = self.users.lock().get_mut(&id) {
            user.last_ip = Some(ip.to_string());
        }
        Ok(())
    }

    async fn mark_email_verified(&self, id: Snowflake) -> RepoResult<()> {
        match self.users.lock().get_mut(&id) {
            Some(user) => {
                user.email_verified = true;
                Ok(())
            }
            None => Err(DomainError::UserNotFound(id)),
        }
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        match self.users.lock().remove(&id) {
            Some(_) => Ok(()),
            None => Err(DomainError::UserNotFound(id)),
        }
    }
}

// ============================================================================
// Friendships
// ============================================================================

#[derive(Default)]
pub struct InMemoryFriendshipRepository {
    edges: Mutex<Vec<Friendship>>,
}

#[async_trait]
impl FriendshipRepository for InMemoryFriendshipRepository {
    async fn find_request(&self, from: Snowflake, to: Snowflake) -> RepoResult<Option<Friendship>> {
        Ok(self
            .edges
            .lock()
            .iter()
            .find(|f| {
                f.from_user == from
                    && f.to_user == to
                    && f.status == FriendshipStatus::Requested
                    && f.is_active
            })
            .cloned())
    }

    async fn find_between(
        &self,
        a: Snowflake,
        b: Snowflake,
        status: FriendshipStatus,
    ) -> RepoResult<Option<Friendship>> {
        Ok(self
            .edges
            .lock()
            .iter()
            .find(|f| {
                f.status == status
                    && f.is_active
                    && ((f.from_user == a && f.to_user == b)
                        || (f.from_user == b && f.to_user == a))
            })
            .cloned())
    }

    async fn create(&self, friendship: &Friendship) -> RepoResult<()> {
        let mut edges = self.edges.lock();
        // One live request per ordered pair, as the partial unique index
        let duplicate = edges.iter().any(|f| {
            f.from_user == friendship.from_user
                && f.to_user == friendship.to_user
                && f.status == FriendshipStatus::Requested
                && f.is_active
        });
        if duplicate && friendship.status == FriendshipStatus::Requested {
            return Err(DomainError::FriendRequestExists);
        }
        edges.push(friendship.clone());
        Ok(())
    }

    async fn update(&self, friendship: &Friendship) -> RepoResult<()> {
        let mut edges = self.edges.lock();
        match edges.iter_mut().find(|f| f.id == friendship.id) {
            Some(slot) => {
                *slot = friendship.clone();
                Ok(())
            }
            None => Err(DomainError::FriendRequestNotFound),
        }
    }

    async fn remove_accepted(&self, a: Snowflake, b: Snowflake) -> RepoResult<u64> {
        let mut edges = self.edges.lock();
        let before = edges.len();
        edges.retain(|f| {
            !(f.status == FriendshipStatus::Accepted
                && ((f.from_user == a && f.to_user == b)
                    || (f.from_user == b && f.to_user == a)))
        });
        Ok((before - edges.len()) as u64)
    }

    async fn friends_of(&self, user: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .edges
            .lock()
            .iter()
            .filter(|f| f.status == FriendshipStatus::Accepted && f.is_active && f.involves(user))
            .filter_map(|f| f.other_end(user))
            .collect())
    }

    async fn incoming_requests(&self, user: Snowflake) -> RepoResult<Vec<Friendship>> {
        Ok(self
            .edges
            .lock()
            .iter()
            .filter(|f| {
                f.to_user == user && f.status == FriendshipStatus::Requested && f.is_active
            })
            .cloned()
            .collect())
    }
}

impl InMemoryFriendshipRepository {
    /// Count of live REQUESTED edges between the pair, both directions
    pub fn pending_between(&self, a: Snowflake, b: Snowflake) -> usize {
        self.edges
            .lock()
            .iter()
            .filter(|f| {
                f.status == FriendshipStatus::Requested
                    && f.is_active
                    && ((f.from_user == a && f.to_user == b)
                        || (f.from_user == b && f.to_user == a))
            })
            .count()
    }
}

// ============================================================================
// Rooms
// ============================================================================

#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<Snowflake, Room>>,
    participants: Mutex<HashMap<Snowflake, BTreeSet<Snowflake>>>,
}

fn pair_key(a: Snowflake, b: Snowflake) -> (Snowflake, Snowflake) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>> {
        Ok(self.rooms.lock().get(&id).cloned())
    }

    async fn find_private_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Room>> {
        let rooms = self.rooms.lock();
        let participants = self.participants.lock();

        Ok(rooms
            .values()
            .find(|room| {
                room.room_type == RoomType::Private
                    && participants
                        .get(&room.id)
                        .is_some_and(|p| p.contains(&a) && p.contains(&b))
            })
            .cloned())
    }

    async fn find_by_family(&self, family_id: Snowflake) -> RepoResult<Option<Room>> {
        Ok(self
            .rooms
            .lock()
            .values()
            .find(|room| room.family_id == Some(family_id))
            .cloned())
    }

    async fn rooms_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Room>> {
        let rooms = self.rooms.lock();
        let participants = self.participants.lock();

        Ok(rooms
            .values()
            .filter(|room| {
                participants
                    .get(&room.id)
                    .is_some_and(|p| p.contains(&user_id))
            })
            .cloned()
            .collect())
    }

    async fn create(&self, room: &Room, members: &[Snowflake]) -> RepoResult<()> {
        let mut rooms = self.rooms.lock();
        let mut participants = self.participants.lock();

        if room.room_type == RoomType::Private {
            let [a, b] = members else {
                return Err(DomainError::ValidationError(
                    "private room requires exactly two participants".to_string(),
                ));
            };
            let key = pair_key(*a, *b);
            let exists = rooms.values().any(|r| {
                r.room_type == RoomType::Private
                    && participants.get(&r.id).is_some_and(|p| {
                        let mut iter = p.iter();
                        (iter.next(), iter.next()) == (Some(&key.0), Some(&key.1))
                    })
            });
            if exists {
                return Err(DomainError::PrivateRoomExists);
            }
        }

        rooms.insert(room.id, room.clone());
        participants.insert(room.id, members.iter().copied().collect());
        Ok(())
    }

    async fn update(&self, room: &Room) -> RepoResult<()> {
        let mut rooms = self.rooms.lock();
        if !rooms.contains_key(&room.id) {
            return Err(DomainError::RoomNotFound(room.id));
        }
        rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        if self.rooms.lock().remove(&id).is_none() {
            return Err(DomainError::RoomNotFound(id));
        }
        self.participants.lock().remove(&id);
        Ok(())
    }

    async fn participants(&self, room_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .participants
            .lock()
            .get(&room_id)
            .map(|p| p.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn is_participant(&self, room_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .participants
            .lock()
            .get(&room_id)
            .is_some_and(|p| p.contains(&user_id)))
    }

    async fn add_participants(&self, room_id: Snowflake, user_ids: &[Snowflake]) -> RepoResult<()> {
        self.participants
            .lock()
            .entry(room_id)
            .or_default()
            .extend(user_ids.iter().copied());
        Ok(())
    }

    async fn remove_participants(
        &self,
        room_id: Snowflake,
        user_ids: &[Snowflake],
    ) -> RepoResult<()> {
        if let Some(p) = self.participants.lock().get_mut(&room_id) {
            for id in user_ids {
                p.remove(id);
            }
        }
        Ok(())
    }

    async fn set_participants(&self, room_id: Snowflake, user_ids: &[Snowflake]) -> RepoResult<()> {
        self.participants
            .lock()
            .insert(room_id, user_ids.iter().copied().collect());
        Ok(())
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<HashMap<Snowflake, Message>>,
    media: Mutex<HashMap<Snowflake, Vec<MessageMedia>>>,
    reads: Mutex<HashMap<Snowflake, BTreeSet<Snowflake>>>,
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.messages.lock().get(&id).cloned())
    }

    async fn recent_in_room(&self, room_id: Snowflake, limit: i64) -> RepoResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .lock()
            .values()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.id.cmp(&a.id));
        messages.truncate(limit.clamp(1, 100) as usize);
        Ok(messages)
    }

    async fn create_with_media(
        &self,
        message: &Message,
        media: &[MessageMedia],
    ) -> RepoResult<()> {
        self.messages.lock().insert(message.id, message.clone());
        if !media.is_empty() {
            self.media.lock().insert(message.id, media.to_vec());
        }
        Ok(())
    }

    async fn update(&self, message: &Message) -> RepoResult<()> {
        let mut messages = self.messages.lock();
        if !messages.contains_key(&message.id) {
            return Err(DomainError::MessageNotFound(message.id));
        }
        messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        if self.messages.lock().remove(&id).is_none() {
            return Err(DomainError::MessageNotFound(id));
        }
        // Media and read rows cascade with the message
        self.media.lock().remove(&id);
        self.reads.lock().remove(&id);
        Ok(())
    }

    async fn media_for(&self, message_id: Snowflake) -> RepoResult<Vec<MessageMedia>> {
        Ok(self.media.lock().get(&message_id).cloned().unwrap_or_default())
    }

    async fn mark_read(&self, message_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        self.reads
            .lock()
            .entry(message_id)
            .or_default()
            .insert(user_id);
        Ok(())
    }

    async fn readers(&self, message_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .reads
            .lock()
            .get(&message_id)
            .map(|r| r.iter().copied().collect())
            .unwrap_or_default())
    }
}

impl InMemoryMessageRepository {
    /// Number of stored messages, across all rooms
    pub fn message_count(&self) -> usize {
        self.messages.lock().len()
    }
}

// ============================================================================
// Families
// ============================================================================

#[derive(Default)]
pub struct InMemoryFamilyRepository {
    families: Mutex<HashMap<Snowflake, Family>>,
    members: Mutex<HashMap<Snowflake, Vec<FamilyMember>>>,
    admins: Mutex<HashMap<Snowflake, BTreeSet<Snowflake>>>,
}

#[async_trait]
impl FamilyRepository for InMemoryFamilyRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Family>> {
        Ok(self.families.lock().get(&id).cloned())
    }

    async fn find_by_invite_code(&self, code: &str) -> RepoResult<Option<Family>> {
        Ok(self
            .families
            .lock()
            .values()
            .find(|f| f.invite_code == code)
            .cloned())
    }

    async fn create(&self, family: &Family) -> RepoResult<()> {
        self.families.lock().insert(family.id, family.clone());
        Ok(())
    }

    async fn update(&self, family: &Family) -> RepoResult<()> {
        let mut families = self.families.lock();
        if !families.contains_key(&family.id) {
            return Err(DomainError::FamilyNotFound(family.id));
        }
        families.insert(family.id, family.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        if self.families.lock().remove(&id).is_none() {
            return Err(DomainError::FamilyNotFound(id));
        }
        self.members.lock().remove(&id);
        self.admins.lock().remove(&id);
        Ok(())
    }

    async fn members(&self, family_id: Snowflake) -> RepoResult<Vec<FamilyMember>> {
        Ok(self.members.lock().get(&family_id).cloned().unwrap_or_default())
    }

    async fn member_ids(&self, family_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .members
            .lock()
            .get(&family_id)
            .map(|m| m.iter().map(|member| member.user_id).collect())
            .unwrap_or_default())
    }

    async fn is_member(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .members
            .lock()
            .get(&family_id)
            .is_some_and(|m| m.iter().any(|member| member.user_id == user_id)))
    }

    async fn add_member(&self, member: &FamilyMember) -> RepoResult<()> {
        let mut members = self.members.lock();
        let entry = members.entry(member.family_id).or_default();
        if entry.iter().any(|m| m.user_id == member.user_id) {
            return Err(DomainError::AlreadyFamilyMember);
        }
        entry.push(member.clone());
        Ok(())
    }

    async fn remove_member(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        if let Some(members) = self.members.lock().get_mut(&family_id) {
            members.retain(|m| m.user_id != user_id);
        }
        if let Some(admins) = self.admins.lock().get_mut(&family_id) {
            admins.remove(&user_id);
        }
        Ok(())
    }

    async fn admin_ids(&self, family_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .admins
            .lock()
            .get(&family_id)
            .map(|a| a.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn is_admin(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .admins
            .lock()
            .get(&family_id)
            .is_some_and(|a| a.contains(&user_id)))
    }

    async fn add_admin(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        self.admins.lock().entry(family_id).or_default().insert(user_id);
        Ok(())
    }

    async fn remove_admin(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        if let Some(admins) = self.admins.lock().get_mut(&family_id) {
            admins.remove(&user_id);
        }
        Ok(())
    }
}

// ============================================================================
// Video calls
// ============================================================================

#[derive(Default)]
pub struct InMemoryVideoCallRepository {
    calls: Mutex<HashMap<Snowflake, VideoCall>>,
    participants: Mutex<HashMap<Snowflake, BTreeSet<Snowflake>>>,
    ice_servers: Mutex<Vec<IceServer>>,
}

#[async_trait]
impl VideoCallRepository for InMemoryVideoCallRepository {
    async fn find_by_room(&self, room_id: Snowflake) -> RepoResult<Option<VideoCall>> {
        Ok(self
            .calls
            .lock()
            .values()
            .find(|c| c.room_id == room_id)
            .cloned())
    }

    async fn create(&self, call: &VideoCall) -> RepoResult<()> {
        self.calls.lock().insert(call.id, call.clone());
        Ok(())
    }

    async fn update(&self, call: &VideoCall) -> RepoResult<()> {
        let mut calls = self.calls.lock();
        if !calls.contains_key(&call.id) {
            return Err(DomainError::CallNotFound(call.room_id));
        }
        calls.insert(call.id, call.clone());
        Ok(())
    }

    async fn add_participant(&self, call_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        self.participants
            .lock()
            .entry(call_id)
            .or_default()
            .insert(user_id);
        Ok(())
    }

    async fn participants(&self, call_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .participants
            .lock()
            .get(&call_id)
            .map(|p| p.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn ice_servers(&self) -> RepoResult<Vec<IceServer>> {
        Ok(self.ice_servers.lock().clone())
    }
}
