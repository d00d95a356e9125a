//! Response DTOs
//!
//! Serialized both into REST responses and into WebSocket envelopes, so
//! every ID is a string (Snowflake serialization).

use chrono::{DateTime, Utc};
use hearth_core::{
    Family, Friendship, IceServer, Message, MessageMedia, Room, RoomType, Snowflake, User,
};
use serde::{Deserialize, Serialize};

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Snowflake,
    pub username: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_online: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name(),
            avatar: user.avatar.clone(),
            is_online: user.is_online,
        }
    }
}

/// A friendship edge with the other endpoint resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendshipResponse {
    pub id: Snowflake,
    pub from_user: UserResponse,
    pub to_user: Snowflake,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl FriendshipResponse {
    /// Build from an edge and its resolved sender
    pub fn new(friendship: &Friendship, from_user: &User) -> Self {
        Self {
            id: friendship.id,
            from_user: UserResponse::from(from_user),
            to_user: friendship.to_user,
            status: friendship.status.as_str().to_string(),
            created_at: friendship.created_at,
        }
    }
}

/// Media item of a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageMediaResponse {
    pub id: Snowflake,
    pub file_path: String,
    pub size_bytes: i64,
    pub extension: String,
}

impl From<&MessageMedia> for MessageMediaResponse {
    fn from(media: &MessageMedia) -> Self {
        Self {
            id: media.id,
            file_path: media.file_path.clone(),
            size_bytes: media.size_bytes,
            extension: media.extension.clone(),
        }
    }
}

/// A message with author, media and read state resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub room_id: Snowflake,
    /// Absent when the author's account was deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserResponse>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Snowflake>,
    pub is_edited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media: Vec<MessageMediaResponse>,
    #[serde(default)]
    pub have_read: Vec<Snowflake>,
    pub created_at: DateTime<Utc>,
}

impl MessageResponse {
    /// Build from a message and its resolved associations
    pub fn new(
        message: &Message,
        author: Option<&User>,
        media: &[MessageMedia],
        have_read: Vec<Snowflake>,
    ) -> Self {
        Self {
            id: message.id,
            room_id: message.room_id,
            author: author.map(UserResponse::from),
            content: message.content.clone(),
            reply_to: message.reply_to,
            is_edited: message.is_edited(),
            edited_at: message.edited_at,
            media: media.iter().map(MessageMediaResponse::from).collect(),
            have_read,
            created_at: message.created_at,
        }
    }
}

/// A room with participants and the latest message resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Snowflake>,
    pub participants: Vec<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_message: Option<MessageResponse>,
    pub created_at: DateTime<Utc>,
}

impl RoomResponse {
    /// Build from a room and its resolved participants
    pub fn new(
        room: &Room,
        participants: Vec<UserResponse>,
        latest_message: Option<MessageResponse>,
    ) -> Self {
        Self {
            id: room.id,
            room_type: room.room_type,
            title: room.title.clone(),
            description: room.description.clone(),
            avatar: room.avatar.clone(),
            family_id: room.family_id,
            created_by: room.created_by,
            participants,
            latest_message,
            created_at: room.created_at,
        }
    }
}

/// A family with members resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyResponse {
    pub id: Snowflake,
    pub name: String,
    pub creator_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub invite_code: String,
    pub members: Vec<UserResponse>,
    pub admins: Vec<Snowflake>,
    pub created_at: DateTime<Utc>,
}

impl FamilyResponse {
    /// Build from a family and its resolved members
    pub fn new(family: &Family, members: Vec<UserResponse>, admins: Vec<Snowflake>) -> Self {
        Self {
            id: family.id,
            name: family.name.clone(),
            creator_id: family.creator_id,
            avatar: family.avatar.clone(),
            invite_code: family.invite_code.clone(),
            members,
            admins,
            created_at: family.created_at,
        }
    }
}

/// Everything a client needs to join a video call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoJoinResponse {
    pub token: String,
    pub server_url: String,
    pub room_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    pub ice_servers: Vec<IceServer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_serializes_ids_as_strings() {
        let message = Message::new(
            Snowflake::new(1),
            Snowflake::new(2),
            Snowflake::new(3),
            "hello".to_string(),
        );
        let response = MessageResponse::new(&message, None, &[], vec![]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["id"], "1");
        assert_eq!(json["room_id"], "2");
        assert!(json.get("author").is_none());
        assert_eq!(json["is_edited"], false);
    }

    #[test]
    fn test_room_response_renames_type_field() {
        let room = Room::new_private(Snowflake::new(5), Snowflake::new(1));
        let response = RoomResponse::new(&room, vec![], None);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["type"], "private");
        assert!(json.get("title").is_none());
    }
}
