//! Presence service
//!
//! Owns the User.is_online flag. The gateway calls `connected` when it
//! admits a presence connection and `disconnected` when the user's last
//! connection drops; the flag lives in the store and is last-write-wins
//! under concurrent toggles.

use hearth_cache::{ChannelEvent, GroupChannel};
use hearth_core::{EventKind, Snowflake};
use serde_json::json;
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mark the user online
    #[instrument(skip(self))]
    pub async fn connected(&self, user_id: Snowflake) -> ServiceResult<()> {
        self.set_online(user_id, true).await
    }

    /// Mark the user offline
    #[instrument(skip(self))]
    pub async fn disconnected(&self, user_id: Snowflake) -> ServiceResult<()> {
        self.set_online(user_id, false).await
    }

    /// Record the address a connection came from
    #[instrument(skip(self))]
    pub async fn record_ip(&self, user_id: Snowflake, ip: &str) -> ServiceResult<()> {
        self.ctx.user_repo().set_last_ip(user_id, ip).await?;
        Ok(())
    }

    async fn set_online(&self, user_id: Snowflake, online: bool) -> ServiceResult<()> {
        self.ctx.user_repo().set_online(user_id, online).await?;

        debug!(user_id = %user_id, online = online, "Presence updated");

        let event = ChannelEvent::new(
            EventKind::PresenceUpdate,
            json!({
                "user_id": user_id,
                "is_online": online,
            }),
        );
        self.ctx
            .publisher()
            .publish(&GroupChannel::broadcast(), &event)
            .await
            .ok();

        Ok(())
    }
}
