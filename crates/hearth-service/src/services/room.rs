//! Room service
//!
//! Resolves and manages chat rooms: the canonical private room per user
//! pair, ad hoc group rooms, and the system-managed family rooms.

use hearth_core::{DomainError, Room, Snowflake};
use tracing::{info, instrument};

use crate::dto::{CreateGroupRequest, MessageResponse, RoomResponse, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// How many participants a group room may hold
const MAX_GROUP_SIZE: usize = 100;

/// Room service
pub struct RoomService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoomService<'a> {
    /// Create a new RoomService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Find or create the private room between two users.
    ///
    /// Lookup and create race against other connections; the storage
    /// layer's unordered-pair uniqueness turns the loser's insert into a
    /// conflict, which is resolved by re-reading the winner's room.
    #[instrument(skip(self))]
    pub async fn get_or_create_private(
        &self,
        user: Snowflake,
        other: Snowflake,
    ) -> ServiceResult<RoomResponse> {
        if user == other {
            return Err(DomainError::SelfPrivateRoom.into());
        }

        if self.ctx.user_repo().find_by_id(other).await?.is_none() {
            return Err(ServiceError::not_found("User", other.to_string()));
        }

        if let Some(existing) = self
            .ctx
            .room_repo()
            .find_private_between(user, other)
            .await?
        {
            return self.to_response(&existing).await;
        }

        let room = Room::new_private(self.ctx.generate_id(), user);
        match self.ctx.room_repo().create(&room, &[user, other]).await {
            Ok(()) => {
                info!(room_id = %room.id, a = %user, b = %other, "Private room created");
                self.to_response(&room).await
            }
            Err(DomainError::PrivateRoomExists) => {
                // Lost the race; the other writer's room is the canonical one
                let existing = self
                    .ctx
                    .room_repo()
                    .find_private_between(user, other)
                    .await?
                    .ok_or_else(|| ServiceError::internal("private room vanished after conflict"))?;
                self.to_response(&existing).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create a group room; the creator always joins the member set
    #[instrument(skip(self, request))]
    pub async fn create_group(
        &self,
        creator: Snowflake,
        request: CreateGroupRequest,
    ) -> ServiceResult<RoomResponse> {
        let mut members = parse_ids(&request.member_ids)?;
        if !members.contains(&creator) {
            members.push(creator);
        }
        if members.len() > MAX_GROUP_SIZE {
            return Err(ServiceError::validation(format!(
                "group rooms hold at most {MAX_GROUP_SIZE} participants"
            )));
        }

        let room = Room::new_group(
            self.ctx.generate_id(),
            creator,
            request.title,
            request.description,
        );
        self.ctx.room_repo().create(&room, &members).await?;

        info!(room_id = %room.id, creator = %creator, "Group room created");
        self.to_response(&room).await
    }

    /// Bring the family's room in line with its current membership.
    ///
    /// Idempotent: creates the room on first call, afterwards updates the
    /// title and replaces the participant set. Called explicitly from
    /// every family-membership mutation.
    #[instrument(skip(self))]
    pub async fn sync_family_room(&self, family_id: Snowflake) -> ServiceResult<()> {
        let family = self
            .ctx
            .family_repo()
            .find_by_id(family_id)
            .await?
            .ok_or(DomainError::FamilyNotFound(family_id))?;

        let members = self.ctx.family_repo().member_ids(family_id).await?;

        match self.ctx.room_repo().find_by_family(family_id).await? {
            Some(mut room) => {
                room.title = Some(family.name.clone());
                self.ctx.room_repo().update(&room).await?;
                self.ctx
                    .room_repo()
                    .set_participants(room.id, &members)
                    .await?;
            }
            None => {
                let room = Room::new_family(
                    self.ctx.generate_id(),
                    family_id,
                    family.creator_id,
                    family.name.clone(),
                );
                self.ctx.room_repo().create(&room, &members).await?;
                info!(room_id = %room.id, family_id = %family_id, "Family room created");
            }
        }

        Ok(())
    }

    /// Delete the family's room; called when the family itself goes away
    #[instrument(skip(self))]
    pub async fn delete_family_room(&self, family_id: Snowflake) -> ServiceResult<()> {
        if let Some(room) = self.ctx.room_repo().find_by_family(family_id).await? {
            self.ctx.room_repo().delete(room.id).await?;
            info!(room_id = %room.id, family_id = %family_id, "Family room deleted");
        }
        Ok(())
    }

    /// Add participants to a group room (creator only)
    #[instrument(skip(self))]
    pub async fn add_participants(
        &self,
        actor: Snowflake,
        room_id: Snowflake,
        user_ids: &[String],
    ) -> ServiceResult<RoomResponse> {
        let room = self.managed_room(actor, room_id).await?;
        let ids = parse_ids(user_ids)?;

        self.ctx.room_repo().add_participants(room_id, &ids).await?;
        self.to_response(&room).await
    }

    /// Remove participants from a group room (creator only; the creator
    /// itself cannot be removed)
    #[instrument(skip(self))]
    pub async fn remove_participants(
        &self,
        actor: Snowflake,
        room_id: Snowflake,
        user_ids: &[String],
    ) -> ServiceResult<RoomResponse> {
        let room = self.managed_room(actor, room_id).await?;
        let ids = parse_ids(user_ids)?;

        if room.created_by.is_some_and(|owner| ids.contains(&owner)) {
            return Err(DomainError::CannotRemoveCreator.into());
        }

        self.ctx
            .room_repo()
            .remove_participants(room_id, &ids)
            .await?;
        self.to_response(&room).await
    }

    /// Update a room's presentation fields (creator only)
    #[instrument(skip(self, request))]
    pub async fn update_info(
        &self,
        actor: Snowflake,
        room_id: Snowflake,
        request: crate::dto::UpdateRoomRequest,
    ) -> ServiceResult<RoomResponse> {
        let mut room = self.managed_room(actor, room_id).await?;

        if let Some(title) = request.title {
            room.title = Some(title);
        }
        if let Some(description) = request.description {
            room.description = Some(description);
        }
        if let Some(avatar) = request.avatar {
            room.avatar = Some(avatar);
        }

        self.ctx.room_repo().update(&room).await?;
        self.to_response(&room).await
    }

    /// Leave a room. The creator must transfer ownership first.
    #[instrument(skip(self))]
    pub async fn leave(&self, actor: Snowflake, room_id: Snowflake) -> ServiceResult<()> {
        let room = self.existing_room(room_id).await?;

        if room.is_family() {
            return Err(DomainError::FamilyRoomIsManaged.into());
        }
        if room.is_owner(actor) {
            return Err(DomainError::CannotLeaveOwnedRoom.into());
        }

        self.ctx
            .room_repo()
            .remove_participants(room_id, &[actor])
            .await?;

        info!(room_id = %room_id, user = %actor, "Left room");
        Ok(())
    }

    /// Transfer room ownership; the new owner must already participate
    #[instrument(skip(self))]
    pub async fn transfer_ownership(
        &self,
        actor: Snowflake,
        room_id: Snowflake,
        new_owner: Snowflake,
    ) -> ServiceResult<RoomResponse> {
        let mut room = self.existing_room(room_id).await?;

        if !room.is_owner(actor) {
            return Err(DomainError::NotRoomCreator.into());
        }
        if !self
            .ctx
            .room_repo()
            .is_participant(room_id, new_owner)
            .await?
        {
            return Err(DomainError::OwnerNotParticipant.into());
        }

        room.created_by = Some(new_owner);
        self.ctx.room_repo().update(&room).await?;

        info!(room_id = %room_id, new_owner = %new_owner, "Room ownership transferred");
        self.to_response(&room).await
    }

    /// Delete a room (creator only); messages cascade
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: Snowflake, room_id: Snowflake) -> ServiceResult<()> {
        let room = self.existing_room(room_id).await?;

        if room.is_family() {
            return Err(DomainError::FamilyRoomIsManaged.into());
        }
        if !room.is_owner(actor) {
            return Err(DomainError::NotRoomCreator.into());
        }

        self.ctx.room_repo().delete(room_id).await?;
        info!(room_id = %room_id, "Room deleted");
        Ok(())
    }

    /// All rooms the user participates in, with participants and the
    /// latest message resolved (the presence channel's `pull_rooms`)
    #[instrument(skip(self))]
    pub async fn rooms_for_user(&self, user: Snowflake) -> ServiceResult<Vec<RoomResponse>> {
        let rooms = self.ctx.room_repo().rooms_for_user(user).await?;

        let mut responses = Vec::with_capacity(rooms.len());
        for room in rooms {
            responses.push(self.to_response(&room).await?);
        }
        Ok(responses)
    }

    /// Resolve one room the caller participates in
    #[instrument(skip(self))]
    pub async fn room_for_user(
        &self,
        user: Snowflake,
        room_id: Snowflake,
    ) -> ServiceResult<RoomResponse> {
        let room = self.existing_room(room_id).await?;

        if !self.ctx.room_repo().is_participant(room_id, user).await? {
            return Err(DomainError::NotParticipant.into());
        }
        self.to_response(&room).await
    }

    // === Helpers ===

    async fn existing_room(&self, room_id: Snowflake) -> ServiceResult<Room> {
        self.ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| DomainError::RoomNotFound(room_id).into())
    }

    /// A room the actor may manage: must exist, must not be
    /// system-managed, and the actor must be its creator.
    async fn managed_room(&self, actor: Snowflake, room_id: Snowflake) -> ServiceResult<Room> {
        let room = self.existing_room(room_id).await?;

        if room.is_family() {
            return Err(DomainError::FamilyRoomIsManaged.into());
        }
        if !room.is_owner(actor) {
            return Err(DomainError::NotRoomCreator.into());
        }
        Ok(room)
    }

    /// Assemble the response shape shared by every room-returning call
    async fn to_response(&self, room: &Room) -> ServiceResult<RoomResponse> {
        let participant_ids = self.ctx.room_repo().participants(room.id).await?;

        let mut participants = Vec::with_capacity(participant_ids.len());
        for id in participant_ids {
            if let Some(user) = self.ctx.user_repo().find_by_id(id).await? {
                participants.push(UserResponse::from(&user));
            }
        }

        let latest_message = match self
            .ctx
            .message_repo()
            .recent_in_room(room.id, 1)
            .await?
            .into_iter()
            .next()
        {
            Some(message) => {
                let author = match message.author_id {
                    Some(id) => self.ctx.user_repo().find_by_id(id).await?,
                    None => None,
                };
                let readers = self.ctx.message_repo().readers(message.id).await?;
                Some(MessageResponse::new(
                    &message,
                    author.as_ref(),
                    &[],
                    readers,
                ))
            }
            None => None,
        };

        Ok(RoomResponse::new(room, participants, latest_message))
    }
}

/// Parse a batch of string IDs, rejecting the whole batch on one bad entry
pub(crate) fn parse_ids(raw: &[String]) -> ServiceResult<Vec<Snowflake>> {
    raw.iter()
        .map(|s| {
            Snowflake::parse(s)
                .map_err(|_| ServiceError::validation(format!("invalid id: {s}")))
        })
        .collect()
}
