//! Friendship service
//!
//! The friend-request state machine: none -> REQUESTED -> ACCEPTED or
//! DECLINED, with removal of accepted edges as a terminal hard delete.

use hearth_cache::ChannelEvent;
use hearth_core::{EventKind, Friendship, FriendshipStatus, Snowflake};
use tracing::{info, instrument};

use crate::dto::{FriendshipResponse, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Friendship service
pub struct FriendshipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FriendshipService<'a> {
    /// Create a new FriendshipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a friend request from `from` to `to`.
    ///
    /// Duplicate detection looks at both directions: if either side
    /// already has a pending request or the pair is already friends, the
    /// call is rejected with a conflict.
    #[instrument(skip(self))]
    pub async fn send_request(
        &self,
        from: Snowflake,
        to: Snowflake,
    ) -> ServiceResult<FriendshipResponse> {
        if from == to {
            return Err(hearth_core::DomainError::SelfFriendRequest.into());
        }

        if self.ctx.user_repo().find_by_id(to).await?.is_none() {
            return Err(ServiceError::not_found("User", to.to_string()));
        }

        if self
            .ctx
            .friendship_repo()
            .find_between(from, to, FriendshipStatus::Requested)
            .await?
            .is_some()
        {
            return Err(hearth_core::DomainError::FriendRequestExists.into());
        }

        if self
            .ctx
            .friendship_repo()
            .find_between(from, to, FriendshipStatus::Accepted)
            .await?
            .is_some()
        {
            return Err(hearth_core::DomainError::AlreadyFriends.into());
        }

        let friendship = Friendship::new_request(self.ctx.generate_id(), from, to);
        self.ctx.friendship_repo().create(&friendship).await?;

        let sender = self
            .ctx
            .user_repo()
            .find_by_id(from)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", from.to_string()))?;

        info!(from = %from, to = %to, "Friend request sent");

        let response = FriendshipResponse::new(&friendship, &sender);

        // Notify the recipient's live connections
        let event = ChannelEvent::new(
            EventKind::FriendRequest,
            serde_json::to_value(&response).unwrap_or_default(),
        );
        self.ctx.publisher().publish_to_user(to, &event).await.ok();

        Ok(response)
    }

    /// Accept the pending request `from -> by`
    #[instrument(skip(self))]
    pub async fn accept(&self, by: Snowflake, from: Snowflake) -> ServiceResult<()> {
        let mut friendship = self
            .ctx
            .friendship_repo()
            .find_request(from, by)
            .await?
            .ok_or(hearth_core::DomainError::FriendRequestNotFound)?;

        friendship.accept();
        self.ctx.friendship_repo().update(&friendship).await?;

        info!(from = %from, by = %by, "Friend request accepted");
        Ok(())
    }

    /// Decline the pending request `from -> by`
    #[instrument(skip(self))]
    pub async fn decline(&self, by: Snowflake, from: Snowflake) -> ServiceResult<()> {
        let mut friendship = self
            .ctx
            .friendship_repo()
            .find_request(from, by)
            .await?
            .ok_or(hearth_core::DomainError::FriendRequestNotFound)?;

        friendship.decline();
        self.ctx.friendship_repo().update(&friendship).await?;

        info!(from = %from, by = %by, "Friend request declined");
        Ok(())
    }

    /// Remove any accepted friendship between the pair.
    ///
    /// Always succeeds; removing a friendship that does not exist is a
    /// no-op.
    #[instrument(skip(self))]
    pub async fn remove(&self, user: Snowflake, friend: Snowflake) -> ServiceResult<()> {
        let removed = self
            .ctx
            .friendship_repo()
            .remove_accepted(user, friend)
            .await?;

        if removed > 0 {
            info!(user = %user, friend = %friend, "Friendship removed");
        }
        Ok(())
    }

    /// Active friends of a user, both directions
    #[instrument(skip(self))]
    pub async fn list_friends(&self, user: Snowflake) -> ServiceResult<Vec<UserResponse>> {
        let ids = self.ctx.friendship_repo().friends_of(user).await?;

        let mut friends = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(friend) = self.ctx.user_repo().find_by_id(id).await? {
                friends.push(UserResponse::from(&friend));
            }
        }
        Ok(friends)
    }

    /// Pending requests addressed to the user
    #[instrument(skip(self))]
    pub async fn incoming_requests(
        &self,
        user: Snowflake,
    ) -> ServiceResult<Vec<FriendshipResponse>> {
        let requests = self.ctx.friendship_repo().incoming_requests(user).await?;

        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            if let Some(sender) = self.ctx.user_repo().find_by_id(request.from_user).await? {
                responses.push(FriendshipResponse::new(&request, &sender));
            }
        }
        Ok(responses)
    }
}
