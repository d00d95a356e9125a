//! Friendship database model

use chrono::{DateTime, Utc};
use hearth_core::{Friendship, FriendshipStatus, Snowflake};
use sqlx::FromRow;

/// Database model for the friendships table
#[derive(Debug, Clone, FromRow)]
pub struct FriendshipModel {
    pub id: i64,
    pub from_user: i64,
    pub to_user: i64,
    pub status: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FriendshipModel> for Friendship {
    fn from(m: FriendshipModel) -> Self {
        Friendship {
            id: Snowflake::new(m.id),
            from_user: Snowflake::new(m.from_user),
            to_user: Snowflake::new(m.to_user),
            // Unknown status strings cannot appear: the column is constrained
            status: FriendshipStatus::parse(&m.status).unwrap_or(FriendshipStatus::Declined),
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
