//! # hearth-db
//!
//! Database layer: PostgreSQL repository implementations built on sqlx.
//! Soft delete is uniform here: every query filters `is_active = TRUE`
//! unless the operation is itself about deletion.

pub mod models;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use repositories::{
    PgFamilyRepository, PgFriendshipRepository, PgMessageRepository, PgRoomRepository,
    PgUserRepository, PgVideoCallRepository,
};
