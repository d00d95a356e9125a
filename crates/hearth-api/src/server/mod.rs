//! Server setup and initialization

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
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

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application
pub fn create_app(state: AppState) -> Router {
    let api = apply_middleware(
        create_router(),
        &state.config().rate_limit,
        &state.config().cors,
        state.config().app.env.is_production(),
    );

    // Health probes skip the middleware stack
    api.merge(health_routes()).with_state(state)
}

/// Initialize all dependencies and create the AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
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
        .publisher(Publisher::new(redis_pool))
        .token_service(token_service)
        .video_token_issuer(video_token_issuer)
        .mailer(mailer)
        .snowflake_generator(snowflake_generator)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));

    let state = create_app_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
