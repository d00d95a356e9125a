//! Gateway server setup and bootstrap

mod handler;
mod state;

pub use state::GatewayState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use hearth_cache::{Publisher, RedisPool, RedisPoolConfig};
use hearth_common::{AppConfig, AppError, JwtVideoTokenIssuer, Mailer, TokenService};
use hearth_core::SnowflakeGenerator;
use hearth_db::{
    create_pool, PgFamilyRepository, PgFriendshipRepository, PgMessageRepository,
    PgRoomRepository, PgUserRepository, PgVideoCallRepository,
};
use hearth_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::info;

use crate::broadcast::{EventDispatcher, EventDispatcherConfig};
use crate::connection::ConnectionManager;

/// Build the gateway router
pub fn create_app(state: GatewayState) -> Router {
    Router::new()
        .route("/ws/presence", get(handler::presence_handler))
        .route("/ws/chat/:room_id", get(handler::chat_handler))
        .with_state(state)
}

/// Wire all dependencies and create the gateway state
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = hearth_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    };
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool = RedisPool::new(RedisPoolConfig::from(&config.redis))
        .map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis connection established");

    let token_service = Arc::new(TokenService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let mailer = Arc::new(Mailer::from_config(&config.smtp)?);
    let video_token_issuer = Arc::new(JwtVideoTokenIssuer::from_config(&config.video));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let service_context = ServiceContextBuilder::new()
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .friendship_repo(Arc::new(PgFriendshipRepository::new(pool.clone())))
        .room_repo(Arc::new(PgRoomRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
        .family_repo(Arc::new(PgFamilyRepository::new(pool.clone())))
        .video_call_repo(Arc::new(PgVideoCallRepository::new(pool)))
        .publisher(Publisher::new(redis_pool.clone()))
        .token_service(token_service)
        .video_token_issuer(video_token_issuer)
        .mailer(mailer)
        .snowflake_generator(snowflake_generator)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let connection_manager = Arc::new(ConnectionManager::new());

    let dispatcher_config = EventDispatcherConfig {
        redis_url: config.redis.url.clone(),
        ..EventDispatcherConfig::default()
    };
    let event_dispatcher = Arc::new(
        EventDispatcher::new(dispatcher_config, connection_manager.clone())
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?,
    );
    event_dispatcher.start();

    Ok(GatewayState::new(
        service_context,
        connection_manager,
        event_dispatcher,
        config,
    ))
}

/// Run the gateway with the given configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway.port));

    let state = create_gateway_state(config).await?;
    let app = create_app(state);

    info!("Gateway listening on ws://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}
