//! Message and media database models

use chrono::{DateTime, Utc};
use hearth_core::{Message, MessageMedia, Snowflake};
use sqlx::FromRow;

/// Database model for the messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub room_id: i64,
    pub author_id: Option<i64>,
    pub content: String,
    pub reply_to: Option<i64>,
    pub edited_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MessageModel> for Message {
    fn from(m: MessageModel) -> Self {
        Message {
            id: Snowflake::new(m.id),
            room_id: Snowflake::new(m.room_id),
            author_id: m.author_id.map(Snowflake::new),
            content: m.content,
            reply_to: m.reply_to.map(Snowflake::new),
            edited_at: m.edited_at,
            created_at: m.created_at,
        }
    }
}

/// Database model for the message_media table
///
/// Media rows are owned by their message (ON DELETE CASCADE): deleting a
/// message never leaves orphaned media behind.
#[derive(Debug, Clone, FromRow)]
pub struct MessageMediaModel {
    pub id: i64,
    pub message_id: i64,
    pub file_path: String,
    pub size_bytes: i64,
    pub extension: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageMediaModel> for MessageMedia {
    fn from(m: MessageMediaModel) -> Self {
        MessageMedia {
            id: Snowflake::new(m.id),
            message_id: Snowflake::new(m.message_id),
            file_path: m.file_path,
            size_bytes: m.size_bytes,
            extension: m.extension,
            created_at: m.created_at,
        }
    }
}
