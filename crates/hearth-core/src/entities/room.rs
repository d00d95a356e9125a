//! Room entity - a messaging channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Room kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    /// One-to-one room; exactly one per unordered pair of users
    Private,
    /// Ad hoc multi-user room with an owner
    Group,
    /// System-managed room mirroring a family's membership
    Family,
}

impl RoomType {
    /// Storage representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Family => "family",
        }
    }

    /// Parse the storage representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "private" => Some(Self::Private),
            "group" => Some(Self::Group),
            "family" => Some(Self::Family),
            _ => None,
        }
    }
}

/// Room entity
///
/// Participants are a many-to-many association resolved through the
/// repository; the entity carries only its own columns. Family rooms are
/// linked to the owning family and kept in sync by the room service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: Snowflake,
    pub room_type: RoomType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub family_id: Option<Snowflake>,
    pub created_by: Option<Snowflake>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Create a new private room between two users
    pub fn new_private(id: Snowflake, created_by: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            room_type: RoomType::Private,
            title: None,
            description: None,
            avatar: None,
            family_id: None,
            created_by: Some(created_by),
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new group room
    pub fn new_group(
        id: Snowflake,
        created_by: Snowflake,
        title: String,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            room_type: RoomType::Group,
            title: Some(title),
            description,
            avatar: None,
            family_id: None,
            created_by: Some(created_by),
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create the system-managed room of a family
    pub fn new_family(id: Snowflake, family_id: Snowflake, creator: Snowflake, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            room_type: RoomType::Family,
            title: Some(title),
            description: None,
            avatar: None,
            family_id: Some(family_id),
            created_by: Some(creator),
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_private(&self) -> bool {
        self.room_type == RoomType::Private
    }

    #[inline]
    pub fn is_family(&self) -> bool {
        self.room_type == RoomType::Family
    }

    /// Whether the given user owns this room
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.created_by == Some(user_id)
    }

    /// Title for display, falling back to "Room <id>"
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Room {}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_room() {
        let room = Room::new_private(Snowflake::new(1), Snowflake::new(10));
        assert!(room.is_private());
        assert!(!room.is_family());
        assert!(room.is_owner(Snowflake::new(10)));
        assert_eq!(room.display_title(), "Room 1");
    }

    #[test]
    fn test_group_room() {
        let room = Room::new_group(
            Snowflake::new(2),
            Snowflake::new(10),
            "Weekend plans".to_string(),
            None,
        );
        assert_eq!(room.room_type, RoomType::Group);
        assert_eq!(room.display_title(), "Weekend plans");
    }

    #[test]
    fn test_family_room_links_family() {
        let room = Room::new_family(
            Snowflake::new(3),
            Snowflake::new(77),
            Snowflake::new(10),
            "The Lovelaces".to_string(),
        );
        assert!(room.is_family());
        assert_eq!(room.family_id, Some(Snowflake::new(77)));
    }

    #[test]
    fn test_room_type_roundtrip() {
        for t in [RoomType::Private, RoomType::Group, RoomType::Family] {
            assert_eq!(RoomType::parse(t.as_str()), Some(t));
        }
        assert_eq!(RoomType::parse("channel"), None);
    }
}
