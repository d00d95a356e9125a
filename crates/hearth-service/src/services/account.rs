//! Account service
//!
//! Profile reads/updates and the verification mail flow. The identity
//! provider owns passwords and the OAuth handshake; this side only issues
//! and validates its own access tokens.

use hearth_common::OutgoingMail;
use hearth_core::Snowflake;
use tracing::{info, instrument};

use crate::dto::{UpdateProfileRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Account service
pub struct AccountService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccountService<'a> {
    /// Create a new AccountService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fetch the caller's own profile
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        Ok(UserResponse::from(&user))
    }

    /// Fetch another user's public profile
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        self.me(user_id).await
    }

    /// Update the caller's profile fields
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Snowflake,
        request: UpdateProfileRequest,
    ) -> ServiceResult<UserResponse> {
        let mut user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        if let Some(first_name) = request.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name;
        }
        if let Some(avatar) = request.avatar {
            user.avatar = Some(avatar);
        }

        self.ctx.user_repo().update(&user).await?;
        Ok(UserResponse::from(&user))
    }

    /// Send the address-verification mail.
    ///
    /// Delivery is fire-and-forget; relay failures are the mailer's
    /// problem and never surface here.
    #[instrument(skip(self, verify_base_url))]
    pub async fn send_verification_email(
        &self,
        user_id: Snowflake,
        verify_base_url: &str,
    ) -> ServiceResult<()> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        let token = self.ctx.token_service().issue(user.id, &user.email)?;
        let link = format!("{verify_base_url}/verify-email/{token}");

        let mail = OutgoingMail::to_one(
            "Verify your email address",
            format!("Click the link to verify your email: {link}"),
            user.email.clone(),
        );
        self.ctx.mailer().send(&mail).await;

        info!(user_id = %user_id, "Verification mail queued");
        Ok(())
    }

    /// Redeem a verification token and mark the address verified
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> ServiceResult<UserResponse> {
        let claims = self.ctx.token_service().validate(token)?;
        let user_id = claims.user_id()?;

        self.ctx.user_repo().mark_email_verified(user_id).await?;

        info!(user_id = %user_id, "Email verified");
        self.me(user_id).await
    }
}
