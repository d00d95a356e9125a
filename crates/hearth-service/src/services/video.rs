//! Video call service
//!
//! Calls are created lazily: the first participant to join a room's call
//! creates the record. The join token comes from the external issuer; the
//! ICE server list rides along with it.

use hearth_core::{CallStatus, DomainError, Snowflake, VideoCall};
use tracing::{info, instrument};

use crate::dto::VideoJoinResponse;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::message::MessageService;

/// Video call service
pub struct VideoService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VideoService<'a> {
    /// Create a new VideoService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Join (or lazily start) the video call of a room.
    ///
    /// Only participants of the room may join. Returns the signed join
    /// token, the media server URL and the active ICE servers.
    #[instrument(skip(self))]
    pub async fn join_call(
        &self,
        user_id: Snowflake,
        room_id: Snowflake,
    ) -> ServiceResult<VideoJoinResponse> {
        let room = self
            .ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or(DomainError::RoomNotFound(room_id))?;

        MessageService::new(self.ctx)
            .require_participant(room_id, user_id)
            .await?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        let call = match self.ctx.video_call_repo().find_by_room(room_id).await? {
            Some(mut call) => {
                // A previously ended call restarts on the next join
                if call.status == CallStatus::Ended {
                    call.status = CallStatus::Ongoing;
                    call.ended_at = None;
                    self.ctx.video_call_repo().update(&call).await?;
                }
                call
            }
            None => {
                let call = VideoCall::start(self.ctx.generate_id(), room_id, user_id);
                self.ctx.video_call_repo().create(&call).await?;
                info!(call_id = %call.id, room_id = %room_id, "Video call started");
                call
            }
        };

        self.ctx
            .video_call_repo()
            .add_participant(call.id, user_id)
            .await?;

        let token = self.ctx.video_token_issuer().issue(&room, &user)?;
        let ice_servers = self.ctx.video_call_repo().ice_servers().await?;

        Ok(VideoJoinResponse {
            token,
            server_url: self.ctx.video_token_issuer().server_url().to_string(),
            room_id,
            room_name: room.title.clone(),
            ice_servers,
        })
    }

    /// End a room's call (call creator or room creator)
    #[instrument(skip(self))]
    pub async fn end_call(&self, user_id: Snowflake, room_id: Snowflake) -> ServiceResult<()> {
        let room = self
            .ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or(DomainError::RoomNotFound(room_id))?;

        let mut call = self
            .ctx
            .video_call_repo()
            .find_by_room(room_id)
            .await?
            .ok_or(DomainError::CallNotFound(room_id))?;

        if call.created_by != user_id && !room.is_owner(user_id) {
            return Err(DomainError::NotRoomCreator.into());
        }

        if call.is_ongoing() {
            call.end();
            self.ctx.video_call_repo().update(&call).await?;
            info!(call_id = %call.id, room_id = %room_id, "Video call ended");
        }

        Ok(())
    }
}
