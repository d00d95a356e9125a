//! Error handling utilities for repositories

use hearth_core::error::DomainError;
use hearth_core::Snowflake;
use sqlx::Error as SqlxError;

/// Convert a SQLx error to a DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Map a unique-constraint violation to a specific domain error,
/// everything else to a generic database error.
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Create a "user not found" error
pub fn user_not_found(id: Snowflake) -> DomainError {
    DomainError::UserNotFound(id)
}

/// Create a "room not found" error
pub fn room_not_found(id: Snowflake) -> DomainError {
    DomainError::RoomNotFound(id)
}

/// Create a "message not found" error
pub fn message_not_found(id: Snowflake) -> DomainError {
    DomainError::MessageNotFound(id)
}

/// Create a "family not found" error
pub fn family_not_found(id: Snowflake) -> DomainError {
    DomainError::FamilyNotFound(id)
}
