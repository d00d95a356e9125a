//! # hearth-common
//!
//! Shared utilities: configuration loading, application errors, the access
//! token service, the SMTP mailer with fallback, and tracing setup.

pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod telemetry;

pub use auth::{Claims, JwtVideoTokenIssuer, TokenService, VideoTokenIssuer};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    RateLimitConfig, RedisConfig, ServerConfig, SmtpConfig, SmtpEndpoint, SnowflakeConfig,
    VideoConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use mail::{Mailer, OutgoingMail};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};
