//! Family service
//!
//! Family lifecycle and membership. Every mutation that changes who is in
//! the family ends with an explicit `RoomService::sync_family_room` call,
//! keeping the family's chat room consistent with its membership.

use hearth_core::{DomainError, Family, FamilyMember, Snowflake};
use tracing::{info, instrument};

use crate::dto::{FamilyResponse, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::room::RoomService;

/// Family service
pub struct FamilyService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FamilyService<'a> {
    /// Create a new FamilyService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a family; the creator becomes its first member and the
    /// family room comes up immediately
    #[instrument(skip(self))]
    pub async fn create(&self, creator: Snowflake, name: String) -> ServiceResult<FamilyResponse> {
        let family = Family::new(self.ctx.generate_id(), creator, name);
        self.ctx.family_repo().create(&family).await?;

        let membership = FamilyMember::new(family.id, creator, None);
        self.ctx.family_repo().add_member(&membership).await?;

        RoomService::new(self.ctx).sync_family_room(family.id).await?;

        info!(family_id = %family.id, creator = %creator, "Family created");
        self.to_response(&family).await
    }

    /// Rename a family (creator only); the room title follows
    #[instrument(skip(self))]
    pub async fn rename(
        &self,
        actor: Snowflake,
        family_id: Snowflake,
        name: String,
    ) -> ServiceResult<FamilyResponse> {
        let mut family = self.owned_family(actor, family_id).await?;

        family.name = name;
        self.ctx.family_repo().update(&family).await?;

        RoomService::new(self.ctx).sync_family_room(family_id).await?;
        self.to_response(&family).await
    }

    /// Delete a family (creator only); its room goes with it
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: Snowflake, family_id: Snowflake) -> ServiceResult<()> {
        self.owned_family(actor, family_id).await?;

        RoomService::new(self.ctx).delete_family_room(family_id).await?;
        self.ctx.family_repo().delete(family_id).await?;

        info!(family_id = %family_id, "Family deleted");
        Ok(())
    }

    /// Add a member (creator or admin); rejects duplicates
    #[instrument(skip(self))]
    pub async fn add_member(
        &self,
        actor: Snowflake,
        family_id: Snowflake,
        user_id: Snowflake,
        relation: Option<String>,
    ) -> ServiceResult<FamilyResponse> {
        let family = self.administered_family(actor, family_id).await?;

        if self.ctx.user_repo().find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::not_found("User", user_id.to_string()));
        }

        let membership = FamilyMember::new(family_id, user_id, relation);
        self.ctx.family_repo().add_member(&membership).await?;

        RoomService::new(self.ctx).sync_family_room(family_id).await?;

        info!(family_id = %family_id, user_id = %user_id, "Family member added");
        self.to_response(&family).await
    }

    /// Remove a member (creator or admin); the creator stays
    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        actor: Snowflake,
        family_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<FamilyResponse> {
        let family = self.administered_family(actor, family_id).await?;

        if family.is_creator(user_id) {
            return Err(DomainError::CannotRemoveCreator.into());
        }

        self.ctx
            .family_repo()
            .remove_member(family_id, user_id)
            .await?;

        RoomService::new(self.ctx).sync_family_room(family_id).await?;

        info!(family_id = %family_id, user_id = %user_id, "Family member removed");
        self.to_response(&family).await
    }

    /// Join a family via invite code
    #[instrument(skip(self, invite_code))]
    pub async fn join_by_invite(
        &self,
        user_id: Snowflake,
        invite_code: &str,
    ) -> ServiceResult<FamilyResponse> {
        let family = self
            .ctx
            .family_repo()
            .find_by_invite_code(invite_code)
            .await?
            .ok_or(DomainError::InviteCodeInvalid)?;

        let membership = FamilyMember::new(family.id, user_id, None);
        self.ctx.family_repo().add_member(&membership).await?;

        RoomService::new(self.ctx).sync_family_room(family.id).await?;

        info!(family_id = %family.id, user_id = %user_id, "Joined family by invite");
        self.to_response(&family).await
    }

    /// Grant admin rights to a member (creator only)
    #[instrument(skip(self))]
    pub async fn promote_admin(
        &self,
        actor: Snowflake,
        family_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<FamilyResponse> {
        let family = self.owned_family(actor, family_id).await?;

        if !self.ctx.family_repo().is_member(family_id, user_id).await? {
            return Err(DomainError::NotFamilyMember.into());
        }

        self.ctx.family_repo().add_admin(family_id, user_id).await?;
        self.to_response(&family).await
    }

    /// Revoke admin rights (creator only)
    #[instrument(skip(self))]
    pub async fn demote_admin(
        &self,
        actor: Snowflake,
        family_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<FamilyResponse> {
        let family = self.owned_family(actor, family_id).await?;

        self.ctx
            .family_repo()
            .remove_admin(family_id, user_id)
            .await?;
        self.to_response(&family).await
    }

    /// Replace the invite code (creator only), invalidating the old one
    #[instrument(skip(self))]
    pub async fn rotate_invite_code(
        &self,
        actor: Snowflake,
        family_id: Snowflake,
    ) -> ServiceResult<FamilyResponse> {
        let mut family = self.owned_family(actor, family_id).await?;

        family.rotate_invite_code();
        self.ctx.family_repo().update(&family).await?;

        info!(family_id = %family_id, "Invite code rotated");
        self.to_response(&family).await
    }

    /// Fetch a family the user belongs to
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Snowflake, family_id: Snowflake) -> ServiceResult<FamilyResponse> {
        let family = self.existing_family(family_id).await?;

        if !self.ctx.family_repo().is_member(family_id, user_id).await? {
            return Err(DomainError::NotFamilyMember.into());
        }
        self.to_response(&family).await
    }

    // === Helpers ===

    async fn existing_family(&self, family_id: Snowflake) -> ServiceResult<Family> {
        self.ctx
            .family_repo()
            .find_by_id(family_id)
            .await?
            .ok_or_else(|| DomainError::FamilyNotFound(family_id).into())
    }

    /// A family the actor created
    async fn owned_family(&self, actor: Snowflake, family_id: Snowflake) -> ServiceResult<Family> {
        let family = self.existing_family(family_id).await?;
        if !family.is_creator(actor) {
            return Err(DomainError::NotFamilyCreator.into());
        }
        Ok(family)
    }

    /// A family the actor created or administers
    async fn administered_family(
        &self,
        actor: Snowflake,
        family_id: Snowflake,
    ) -> ServiceResult<Family> {
        let family = self.existing_family(family_id).await?;
        if family.is_creator(actor) {
            return Ok(family);
        }
        if self.ctx.family_repo().is_admin(family_id, actor).await? {
            return Ok(family);
        }
        Err(DomainError::NotFamilyAdmin.into())
    }

    async fn to_response(&self, family: &Family) -> ServiceResult<FamilyResponse> {
        let member_ids = self.ctx.family_repo().member_ids(family.id).await?;

        let mut members = Vec::with_capacity(member_ids.len());
        for id in member_ids {
            if let Some(user) = self.ctx.user_repo().find_by_id(id).await? {
                members.push(UserResponse::from(&user));
            }
        }

        let admins = self.ctx.family_repo().admin_ids(family.id).await?;
        Ok(FamilyResponse::new(family, members, admins))
    }
}
