//! Message entity - a chat message and its attached media

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Message entity
///
/// The author is optional: when an account is deleted its messages are
/// preserved with the author cleared. `reply_to` is a self reference to
/// another message in the same room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub room_id: Snowflake,
    pub author_id: Option<Snowflake>,
    pub content: String,
    pub reply_to: Option<Snowflake>,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new Message
    pub fn new(id: Snowflake, room_id: Snowflake, author_id: Snowflake, content: String) -> Self {
        Self {
            id,
            room_id,
            author_id: Some(author_id),
            content,
            reply_to: None,
            edited_at: None,
            created_at: Utc::now(),
        }
    }

    /// Create a reply to an existing message
    pub fn new_reply(
        id: Snowflake,
        room_id: Snowflake,
        author_id: Snowflake,
        content: String,
        reply_to: Snowflake,
    ) -> Self {
        let mut msg = Self::new(id, room_id, author_id, content);
        msg.reply_to = Some(reply_to);
        msg
    }

    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Check if message is a reply
    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    /// Replace the content and stamp the edit time
    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.edited_at = Some(Utc::now());
    }

    /// Truncated preview for notification payloads, honoring char boundaries
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }

    /// Check if message content is blank
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Media item attached to a message
///
/// The file bytes live in external storage; only the reference, size and
/// extension are recorded here. Media rows are owned by their message and
/// removed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMedia {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub file_path: String,
    pub size_bytes: i64,
    pub extension: String,
    pub created_at: DateTime<Utc>,
}

impl MessageMedia {
    /// Create a new media record
    pub fn new(
        id: Snowflake,
        message_id: Snowflake,
        file_path: String,
        size_bytes: i64,
        extension: String,
    ) -> Self {
        Self {
            id,
            message_id,
            file_path,
            size_bytes,
            extension,
            created_at: Utc::now(),
        }
    }

    /// Check if the media is an image by extension
    pub fn is_image(&self) -> bool {
        matches!(
            self.extension.to_ascii_lowercase().as_str(),
            "png" | "jpg" | "jpeg" | "gif" | "webp"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message::new(
            Snowflake::new(1),
            Snowflake::new(100),
            Snowflake::new(200),
            "Dinner at seven".to_string(),
        )
    }

    #[test]
    fn test_message_creation() {
        let msg = message();
        assert!(!msg.is_edited());
        assert!(!msg.is_reply());
        assert!(!msg.is_empty());
    }

    #[test]
    fn test_message_reply() {
        let msg = Message::new_reply(
            Snowflake::new(2),
            Snowflake::new(100),
            Snowflake::new(200),
            "Sounds good".to_string(),
            Snowflake::new(1),
        );
        assert!(msg.is_reply());
        assert_eq!(msg.reply_to, Some(Snowflake::new(1)));
    }

    #[test]
    fn test_message_edit() {
        let mut msg = message();
        msg.edit("Dinner at eight".to_string());
        assert!(msg.is_edited());
        assert_eq!(msg.content, "Dinner at eight");
    }

    #[test]
    fn test_message_preview() {
        let msg = message();
        assert_eq!(msg.preview(6), "Dinner");
        assert_eq!(msg.preview(100), "Dinner at seven");
    }

    #[test]
    fn test_media_is_image() {
        let media = MessageMedia::new(
            Snowflake::new(1),
            Snowflake::new(1),
            "pictures/20240101_101010.PNG".to_string(),
            2048,
            "PNG".to_string(),
        );
        assert!(media.is_image());

        let doc = MessageMedia::new(
            Snowflake::new(2),
            Snowflake::new(1),
            "docs/recipe.pdf".to_string(),
            4096,
            "pdf".to_string(),
        );
        assert!(!doc.is_image());
    }
}
