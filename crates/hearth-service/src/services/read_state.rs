//! Read receipts and typing indicators
//!
//! Read state is persisted (idempotently); typing signals are ephemeral
//! and only ever exist as a broadcast.

use std::collections::BTreeSet;

use hearth_cache::ChannelEvent;
use hearth_core::{DomainError, EventKind, Snowflake};
use serde_json::json;
use tracing::instrument;

use crate::dto::MessageResponse;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::message::MessageService;

/// Read/typing state tracker
pub struct ReadStateService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReadStateService<'a> {
    /// Create a new ReadStateService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mark messages as read by `user`.
    ///
    /// Idempotent per (user, message). Returns the updated messages and
    /// broadcasts the new read state to each affected room. The user must
    /// participate in every room touched.
    #[instrument(skip(self, message_ids))]
    pub async fn mark_read(
        &self,
        user: Snowflake,
        message_ids: &[String],
    ) -> ServiceResult<Vec<MessageResponse>> {
        let messages_svc = MessageService::new(self.ctx);

        let mut updated = Vec::with_capacity(message_ids.len());
        let mut rooms = BTreeSet::new();

        for raw in message_ids {
            let id = Snowflake::parse(raw)
                .map_err(|_| ServiceError::validation(format!("invalid id: {raw}")))?;

            let message = self
                .ctx
                .message_repo()
                .find_by_id(id)
                .await?
                .ok_or(DomainError::MessageNotFound(id))?;

            if rooms.insert(message.room_id) {
                messages_svc
                    .require_participant(message.room_id, user)
                    .await?;
            }

            self.ctx.message_repo().mark_read(id, user).await?;
            updated.push(messages_svc.to_response(&message).await?);
        }

        for room_id in rooms {
            let in_room: Vec<&MessageResponse> = updated
                .iter()
                .filter(|m| m.room_id == room_id)
                .collect();
            let event = ChannelEvent::new(
                EventKind::ReadMessages,
                serde_json::to_value(&in_room).unwrap_or_default(),
            );
            self.ctx
                .publisher()
                .publish_to_room(room_id, &event)
                .await
                .ok();
        }

        Ok(updated)
    }

    /// Relay a typing signal to the room. Nothing is persisted.
    #[instrument(skip(self))]
    pub async fn typing(&self, user: Snowflake, room_id: Snowflake) -> ServiceResult<()> {
        self.relay(user, room_id, EventKind::Typing).await
    }

    /// Relay a stop-typing signal to the room. Nothing is persisted.
    #[instrument(skip(self))]
    pub async fn stop_typing(&self, user: Snowflake, room_id: Snowflake) -> ServiceResult<()> {
        self.relay(user, room_id, EventKind::StopTyping).await
    }

    async fn relay(
        &self,
        user: Snowflake,
        room_id: Snowflake,
        kind: EventKind,
    ) -> ServiceResult<()> {
        MessageService::new(self.ctx)
            .require_participant(room_id, user)
            .await?;

        let event = ChannelEvent::new(
            kind,
            json!({
                "room_id": room_id,
                "user_id": user,
            }),
        )
        .excluding(user);

        self.ctx
            .publisher()
            .publish_to_room(room_id, &event)
            .await
            .ok();

        Ok(())
    }
}
