//! Room database model

use chrono::{DateTime, Utc};
use hearth_core::{Room, RoomType, Snowflake};
use sqlx::FromRow;

/// Database model for the rooms table
///
/// `pair_lo`/`pair_hi` hold the canonically ordered participant pair of a
/// private room; a unique index over them is what closes the duplicate
/// private room race. They are NULL for group and family rooms.
#[derive(Debug, Clone, FromRow)]
pub struct RoomModel {
    pub id: i64,
    pub room_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub family_id: Option<i64>,
    pub created_by: Option<i64>,
    pub pair_lo: Option<i64>,
    pub pair_hi: Option<i64>,
    pub is_archived: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoomModel> for Room {
    fn from(m: RoomModel) -> Self {
        Room {
            id: Snowflake::new(m.id),
            room_type: RoomType::parse(&m.room_type).unwrap_or(RoomType::Group),
            title: m.title,
            description: m.description,
            avatar: m.avatar,
            family_id: m.family_id.map(Snowflake::new),
            created_by: m.created_by.map(Snowflake::new),
            is_archived: m.is_archived,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
