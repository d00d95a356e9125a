//! Message service
//!
//! The send pipeline: validate, persist message and media atomically,
//! fan out to the room, notify each recipient. Plus edit, delete (behind
//! the deletion authorizer) and history.

use hearth_cache::ChannelEvent;
use hearth_core::{DomainError, EventKind, Message, MessageMedia, Room, Snowflake};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::dto::{MessageResponse, SendMessageRequest, MAX_MESSAGE_LEN};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::{can_delete, FamilyContext};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a message to a room.
    ///
    /// The author must participate in the room, whichever entry point the
    /// request came through. Message and media land in one transaction;
    /// only after the commit are the room broadcast and the per-recipient
    /// notifications published.
    #[instrument(skip(self, request))]
    pub async fn send_message(
        &self,
        author: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let room_id = parse_id(&request.room_id)?;
        let room = self.existing_room(room_id).await?;

        self.require_participant(room_id, author).await?;

        let content = request.content.trim().to_string();
        if content.is_empty() {
            return Err(ServiceError::validation("message content is empty"));
        }
        if content.len() > MAX_MESSAGE_LEN {
            return Err(DomainError::ContentTooLong {
                max: MAX_MESSAGE_LEN,
            }
            .into());
        }

        // A dangling reply reference fails the whole send, before any row
        // is written
        let reply_to = match &request.reply_to {
            Some(raw) => {
                let id = parse_id(raw)?;
                let referenced = self
                    .ctx
                    .message_repo()
                    .find_by_id(id)
                    .await?
                    .ok_or(DomainError::MessageNotFound(id))?;
                if referenced.room_id != room_id {
                    return Err(ServiceError::validation(
                        "reply target is in a different room",
                    ));
                }
                Some(id)
            }
            None => None,
        };

        let message_id = self.ctx.generate_id();
        let mut message = Message::new(message_id, room_id, author, content);
        message.reply_to = reply_to;

        let media: Vec<MessageMedia> = request
            .media
            .iter()
            .map(|upload| {
                if upload.file_path.is_empty() || upload.extension.is_empty() || upload.size_bytes <= 0 {
                    return Err(ServiceError::validation("invalid media item"));
                }
                Ok(MessageMedia::new(
                    self.ctx.generate_id(),
                    message_id,
                    upload.file_path.clone(),
                    upload.size_bytes,
                    upload.extension.clone(),
                ))
            })
            .collect::<ServiceResult<_>>()?;

        self.ctx
            .message_repo()
            .create_with_media(&message, &media)
            .await?;

        info!(message_id = %message_id, room_id = %room_id, "Message created");

        let response = self.to_response(&message).await?;
        let payload = serde_json::to_value(&response).unwrap_or_default();

        // Room broadcast first, then personal notifications; no ordering
        // is guaranteed between the two for any given observer
        let broadcast =
            ChannelEvent::new(EventKind::NewMessage, payload.clone()).excluding(author);
        self.ctx
            .publisher()
            .publish_to_room(room_id, &broadcast)
            .await
            .ok();

        self.notify_recipients(&room, author, payload).await;

        Ok(response)
    }

    /// Edit a message's content (author only)
    #[instrument(skip(self, content))]
    pub async fn edit_message(
        &self,
        actor: Snowflake,
        message_id: Snowflake,
        content: String,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.existing_message(message_id).await?;

        if message.author_id != Some(actor) {
            return Err(DomainError::NotMessageAuthor.into());
        }

        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(ServiceError::validation("message content is empty"));
        }
        if content.len() > MAX_MESSAGE_LEN {
            return Err(DomainError::ContentTooLong {
                max: MAX_MESSAGE_LEN,
            }
            .into());
        }

        message.edit(content);
        self.ctx.message_repo().update(&message).await?;

        info!(message_id = %message_id, "Message edited");

        let response = self.to_response(&message).await?;
        let event = ChannelEvent::new(
            EventKind::EditMessage,
            serde_json::to_value(&response).unwrap_or_default(),
        );
        self.ctx
            .publisher()
            .publish_to_room(message.room_id, &event)
            .await
            .ok();

        Ok(response)
    }

    /// Delete a message if the actor passes the layered permission rule.
    ///
    /// On success the message is hard-deleted (media rows cascade) and the
    /// deletion is broadcast to the room. On failure nothing mutates and
    /// nothing is published.
    #[instrument(skip(self))]
    pub async fn delete_message(
        &self,
        actor: Snowflake,
        message_id: Snowflake,
    ) -> ServiceResult<()> {
        let message = self.existing_message(message_id).await?;
        let room = self.existing_room(message.room_id).await?;

        let family = match room.family_id {
            Some(family_id) => Some(self.family_context(family_id).await?),
            None => None,
        };

        if !can_delete(actor, &message, &room, family.as_ref()) {
            return Err(DomainError::DeleteForbidden.into());
        }

        self.ctx.message_repo().delete(message_id).await?;

        info!(message_id = %message_id, actor = %actor, "Message deleted");

        let event = ChannelEvent::new(
            EventKind::DeleteMessage,
            json!({
                "message": message_id,
                "room_id": message.room_id,
            }),
        );
        self.ctx
            .publisher()
            .publish_to_room(message.room_id, &event)
            .await
            .ok();

        Ok(())
    }

    /// Most recent messages of a room, for the history push and the REST
    /// listing (participants only)
    #[instrument(skip(self))]
    pub async fn room_history(
        &self,
        user: Snowflake,
        room_id: Snowflake,
        limit: i64,
    ) -> ServiceResult<Vec<MessageResponse>> {
        self.existing_room(room_id).await?;
        self.require_participant(room_id, user).await?;

        let messages = self.ctx.message_repo().recent_in_room(room_id, limit).await?;

        let mut responses = Vec::with_capacity(messages.len());
        for message in messages {
            responses.push(self.to_response(&message).await?);
        }
        Ok(responses)
    }

    // === Helpers ===

    async fn existing_room(&self, room_id: Snowflake) -> ServiceResult<Room> {
        self.ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| DomainError::RoomNotFound(room_id).into())
    }

    async fn existing_message(&self, message_id: Snowflake) -> ServiceResult<Message> {
        self.ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| DomainError::MessageNotFound(message_id).into())
    }

    pub(crate) async fn require_participant(
        &self,
        room_id: Snowflake,
        user: Snowflake,
    ) -> ServiceResult<()> {
        if !self.ctx.room_repo().is_participant(room_id, user).await? {
            return Err(DomainError::NotParticipant.into());
        }
        Ok(())
    }

    async fn family_context(&self, family_id: Snowflake) -> ServiceResult<FamilyContext> {
        let family = self
            .ctx
            .family_repo()
            .find_by_id(family_id)
            .await?
            .ok_or(DomainError::FamilyNotFound(family_id))?;

        Ok(FamilyContext {
            creator_id: family.creator_id,
            admin_ids: self.ctx.family_repo().admin_ids(family_id).await?,
            member_ids: self.ctx.family_repo().member_ids(family_id).await?,
        })
    }

    /// Deliver a personal notification to every participant but the author
    async fn notify_recipients(
        &self,
        room: &Room,
        author: Snowflake,
        payload: serde_json::Value,
    ) {
        let participants = match self.ctx.room_repo().participants(room.id).await {
            Ok(p) => p,
            Err(e) => {
                warn!(room_id = %room.id, error = %e, "Participant lookup for notification failed");
                return;
            }
        };

        for participant in participants {
            if participant == author {
                continue;
            }

            let event = ChannelEvent::new(EventKind::NewMessage, payload.clone());
            self.ctx
                .publisher()
                .publish_to_user(participant, &event)
                .await
                .ok();
        }
    }

    /// Assemble a response with author, media and read state resolved
    pub(crate) async fn to_response(&self, message: &Message) -> ServiceResult<MessageResponse> {
        let author = match message.author_id {
            Some(id) => self.ctx.user_repo().find_by_id(id).await?,
            None => None,
        };
        let media = self.ctx.message_repo().media_for(message.id).await?;
        let readers = self.ctx.message_repo().readers(message.id).await?;

        Ok(MessageResponse::new(
            message,
            author.as_ref(),
            &media,
            readers,
        ))
    }
}

fn parse_id(raw: &str) -> ServiceResult<Snowflake> {
    Snowflake::parse(raw).map_err(|_| ServiceError::validation(format!("invalid id: {raw}")))
}
