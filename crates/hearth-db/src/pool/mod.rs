//! Database connection pooling

mod postgres;

pub use postgres::{create_pool, DatabaseConfig, PgPool};
