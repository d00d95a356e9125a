//! Test fixtures
//!
//! Builds a full `ServiceContext` over in-memory repositories. The
//! publisher points at a closed port: publishes fail fast and the
//! services treat that as a missed best-effort delivery, which is exactly
//! the production contract.

use std::sync::Arc;

use hearth_cache::{Publisher, RedisPool, RedisPoolConfig};
use hearth_common::{AppError, Mailer, SmtpConfig, SmtpEndpoint, TokenService, VideoTokenIssuer};
use hearth_core::{Room, Snowflake, SnowflakeGenerator, User};
use hearth_service::{ServiceContext, ServiceContextBuilder};

use crate::memory::{
    InMemoryFamilyRepository, InMemoryFriendshipRepository, InMemoryMessageRepository,
    InMemoryRoomRepository, InMemoryUserRepository, InMemoryVideoCallRepository,
};

/// Issues a fixed token; good enough to assert plumbing
pub struct StaticVideoTokenIssuer;

impl VideoTokenIssuer for StaticVideoTokenIssuer {
    fn issue(&self, _room: &Room, _user: &User) -> Result<String, AppError> {
        Ok("test-join-token".to_string())
    }

    fn server_url(&self) -> &str {
        "wss://video.test.local"
    }
}

/// Everything a service test needs, with handles to the repositories for
/// direct state assertions
pub struct TestHarness {
    pub ctx: ServiceContext,
    pub users: Arc<InMemoryUserRepository>,
    pub friendships: Arc<InMemoryFriendshipRepository>,
    pub rooms: Arc<InMemoryRoomRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub families: Arc<InMemoryFamilyRepository>,
    pub calls: Arc<InMemoryVideoCallRepository>,
}

impl TestHarness {
    /// Build a harness with empty state
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let friendships = Arc::new(InMemoryFriendshipRepository::default());
        let rooms = Arc::new(InMemoryRoomRepository::default());
        let messages = Arc::new(InMemoryMessageRepository::default());
        let families = Arc::new(InMemoryFamilyRepository::default());
        let calls = Arc::new(InMemoryVideoCallRepository::default());

        // Port 1 never has a listener; publishes fail fast and are dropped
        let redis_pool = RedisPool::new(RedisPoolConfig {
            url: "redis://127.0.0.1:1".to_string(),
            max_connections: 2,
        })
        .expect("pool construction is lazy");

        let smtp = SmtpConfig {
            from_address: "noreply@test.local".to_string(),
            primary: SmtpEndpoint {
                host: "smtp.test.local".to_string(),
                port: 587,
                username: None,
                password: None,
            },
            fallback: None,
        };

        let ctx = ServiceContextBuilder::new()
            .user_repo(users.clone())
            .friendship_repo(friendships.clone())
            .room_repo(rooms.clone())
            .message_repo(messages.clone())
            .family_repo(families.clone())
            .video_call_repo(calls.clone())
            .publisher(Publisher::new(redis_pool))
            .token_service(Arc::new(TokenService::new("test-secret", 3600)))
            .video_token_issuer(Arc::new(StaticVideoTokenIssuer))
            .mailer(Arc::new(Mailer::from_config(&smtp).expect("valid smtp config")))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .build()
            .expect("all dependencies provided");

        Self {
            ctx,
            users,
            friendships,
            rooms,
            messages,
            families,
            calls,
        }
    }

    /// Create a user and return its ID
    pub async fn user(&self, username: &str) -> Snowflake {
        let id = self.ctx.generate_id();
        let user = User::new(id, format!("{username}@test.local"), username.to_string());
        self.ctx.user_repo().create(&user).await.expect("user created");
        id
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
