//! Service context - dependency container for services
//!
//! Holds the repositories, the pub/sub publisher, and the shared
//! infrastructure services. Constructed once at startup and cloned into
//! every request handler.

use std::sync::Arc;

use hearth_cache::Publisher;
use hearth_common::{Mailer, TokenService, VideoTokenIssuer};
use hearth_core::traits::{
    FamilyRepository, FriendshipRepository, MessageRepository, RoomRepository, UserRepository,
    VideoCallRepository,
};
use hearth_core::{Snowflake, SnowflakeGenerator};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    friendship_repo: Arc<dyn FriendshipRepository>,
    room_repo: Arc<dyn RoomRepository>,
    message_repo: Arc<dyn MessageRepository>,
    family_repo: Arc<dyn FamilyRepository>,
    video_call_repo: Arc<dyn VideoCallRepository>,

    publisher: Publisher,
    token_service: Arc<TokenService>,
    video_token_issuer: Arc<dyn VideoTokenIssuer>,
    mailer: Arc<Mailer>,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the friendship repository
    pub fn friendship_repo(&self) -> &dyn FriendshipRepository {
        self.friendship_repo.as_ref()
    }

    /// Get the room repository
    pub fn room_repo(&self) -> &dyn RoomRepository {
        self.room_repo.as_ref()
    }

    /// Get the message repository
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    /// Get the family repository
    pub fn family_repo(&self) -> &dyn FamilyRepository {
        self.family_repo.as_ref()
    }

    /// Get the video call repository
    pub fn video_call_repo(&self) -> &dyn VideoCallRepository {
        self.video_call_repo.as_ref()
    }

    // === Infrastructure ===

    /// Get the pub/sub publisher
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Get the access token service
    pub fn token_service(&self) -> &TokenService {
        self.token_service.as_ref()
    }

    /// Get the video join token issuer
    pub fn video_token_issuer(&self) -> &dyn VideoTokenIssuer {
        self.video_token_issuer.as_ref()
    }

    /// Get the mailer
    pub fn mailer(&self) -> &Mailer {
        self.mailer.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("publisher", &"Publisher")
            .finish()
    }
}

/// Builder for the service context
///
/// Every dependency is required; `build` reports the first missing one.
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    friendship_repo: Option<Arc<dyn FriendshipRepository>>,
    room_repo: Option<Arc<dyn RoomRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    family_repo: Option<Arc<dyn FamilyRepository>>,
    video_call_repo: Option<Arc<dyn VideoCallRepository>>,
    publisher: Option<Publisher>,
    token_service: Option<Arc<TokenService>>,
    video_token_issuer: Option<Arc<dyn VideoTokenIssuer>>,
    mailer: Option<Arc<Mailer>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn friendship_repo(mut self, repo: Arc<dyn FriendshipRepository>) -> Self {
        self.friendship_repo = Some(repo);
        self
    }

    pub fn room_repo(mut self, repo: Arc<dyn RoomRepository>) -> Self {
        self.room_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn family_repo(mut self, repo: Arc<dyn FamilyRepository>) -> Self {
        self.family_repo = Some(repo);
        self
    }

    pub fn video_call_repo(mut self, repo: Arc<dyn VideoCallRepository>) -> Self {
        self.video_call_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Publisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn token_service(mut self, service: Arc<TokenService>) -> Self {
        self.token_service = Some(service);
        self
    }

    pub fn video_token_issuer(mut self, issuer: Arc<dyn VideoTokenIssuer>) -> Self {
        self.video_token_issuer = Some(issuer);
        self
    }

    pub fn mailer(mut self, mailer: Arc<Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns a validation error naming the first missing dependency.
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        Ok(ServiceContext {
            user_repo: self
                .user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            friendship_repo: self
                .friendship_repo
                .ok_or_else(|| ServiceError::validation("friendship_repo is required"))?,
            room_repo: self
                .room_repo
                .ok_or_else(|| ServiceError::validation("room_repo is required"))?,
            message_repo: self
                .message_repo
                .ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            family_repo: self
                .family_repo
                .ok_or_else(|| ServiceError::validation("family_repo is required"))?,
            video_call_repo: self
                .video_call_repo
                .ok_or_else(|| ServiceError::validation("video_call_repo is required"))?,
            publisher: self
                .publisher
                .ok_or_else(|| ServiceError::validation("publisher is required"))?,
            token_service: self
                .token_service
                .ok_or_else(|| ServiceError::validation("token_service is required"))?,
            video_token_issuer: self
                .video_token_issuer
                .ok_or_else(|| ServiceError::validation("video_token_issuer is required"))?,
            mailer: self
                .mailer
                .ok_or_else(|| ServiceError::validation("mailer is required"))?,
            snowflake_generator: self
                .snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
        })
    }
}
