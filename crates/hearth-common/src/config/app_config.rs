//! Application configuration structs
//!
//! Loads configuration from environment variables, with a .env file picked
//! up in development.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub gateway: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    pub video: VideoConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// Server configuration (for both API and Gateway)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_token_expiry")]
    pub access_token_expiry: i64,
}

/// A single SMTP relay endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpEndpoint {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Mail delivery configuration: a primary relay and an explicit fallback
/// used when the primary errors.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub from_address: String,
    pub primary: SmtpEndpoint,
    pub fallback: Option<SmtpEndpoint>,
}

/// Video call token issuing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    pub server_url: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_ttl_secs: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "hearth".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_db_max_connections() -> u32 {
    20
}

fn default_db_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_token_expiry() -> i64 {
    3600 // 1 hour
}

fn default_smtp_port() -> u16 {
    587
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

/// A required environment variable
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

/// An optional variable with a computed default
fn optional(name: &str, default: impl FnOnce() -> String) -> String {
    env::var(name).unwrap_or_else(|_| default())
}

/// A required variable parsed into `T`
fn required_parsed<T: FromStr>(name: &'static str) -> Result<T, ConfigError> {
    required(name)?
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name, env::var(name).unwrap_or_default()))
}

/// An optional variable parsed into `T`, falling back on absence or a
/// parse failure
fn parsed_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let smtp_fallback = env::var("SMTP_FALLBACK_HOST").ok().map(|host| SmtpEndpoint {
            host,
            port: parsed_or("SMTP_FALLBACK_PORT", default_smtp_port()),
            username: env::var("SMTP_FALLBACK_USERNAME").ok(),
            password: env::var("SMTP_FALLBACK_PASSWORD").ok(),
        });

        Ok(Self {
            app: AppSettings {
                name: optional("APP_NAME", default_app_name),
                env: parsed_or("APP_ENV", Environment::default()),
            },
            api: ServerConfig {
                host: optional("API_HOST", default_host),
                port: required_parsed("API_PORT")?,
            },
            gateway: ServerConfig {
                host: optional("GATEWAY_HOST", default_host),
                port: required_parsed("GATEWAY_PORT")?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", default_db_max_connections()),
                min_connections: parsed_or("DATABASE_MIN_CONNECTIONS", default_db_min_connections()),
            },
            redis: RedisConfig {
                url: required("REDIS_URL")?,
                max_connections: parsed_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections()),
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                access_token_expiry: parsed_or("JWT_ACCESS_TOKEN_EXPIRY", default_token_expiry()),
            },
            smtp: SmtpConfig {
                from_address: optional("MAIL_FROM", || "noreply@hearth.local".to_string()),
                primary: SmtpEndpoint {
                    host: required("SMTP_HOST")?,
                    port: parsed_or("SMTP_PORT", default_smtp_port()),
                    username: env::var("SMTP_USERNAME").ok(),
                    password: env::var("SMTP_PASSWORD").ok(),
                },
                fallback: smtp_fallback,
            },
            video: VideoConfig {
                server_url: required("VIDEO_SERVER_URL")?,
                api_key: required("VIDEO_API_KEY")?,
                api_secret: required("VIDEO_API_SECRET")?,
                token_ttl_secs: parsed_or("VIDEO_TOKEN_TTL_SECS", default_token_expiry()),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parsed_or(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second(),
                ),
                burst: parsed_or("RATE_LIMIT_BURST", default_burst()),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: parsed_or("WORKER_ID", 0),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
