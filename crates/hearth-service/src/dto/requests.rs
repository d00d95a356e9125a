//! Request DTOs
//!
//! Validated at the edge by the API's `ValidatedJson` extractor and by the
//! gateway before dispatch.

use serde::Deserialize;
use validator::Validate;

/// Maximum message length, mirrored by the service-side check
pub const MAX_MESSAGE_LEN: usize = 4000;

/// A media item attached to a message, already uploaded to file storage
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MediaUpload {
    #[validate(length(min = 1, max = 512))]
    pub file_path: String,
    #[validate(range(min = 1))]
    pub size_bytes: i64,
    #[validate(length(min = 1, max = 16))]
    pub extension: String,
}

/// Send a message to a room
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub room_id: String,
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub media: Vec<MediaUpload>,
}

/// Edit a message's content
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditMessageRequest {
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
}

/// Mark messages as read
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MarkReadRequest {
    #[validate(length(min = 1, max = 100))]
    pub message_ids: Vec<String>,
}

/// Create a group room
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

/// Update a room's presentation fields
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRoomRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Add participants to a group room
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddParticipantsRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_ids: Vec<String>,
}

/// Remove participants from a group room
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RemoveParticipantsRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_ids: Vec<String>,
}

/// Hand a room to a new owner
#[derive(Debug, Clone, Deserialize)]
pub struct TransferOwnershipRequest {
    pub new_owner_id: String,
}

/// Create a family
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFamilyRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

/// Add a member to a family
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddFamilyMemberRequest {
    pub user_id: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub relation: Option<String>,
}

/// Join a family with an invite code
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinFamilyRequest {
    #[validate(length(min = 1, max = 16))]
    pub invite_code: String,
}

/// Update the caller's profile
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_validation() {
        let ok = SendMessageRequest {
            room_id: "1".to_string(),
            content: "hello".to_string(),
            reply_to: None,
            media: vec![],
        };
        assert!(ok.validate().is_ok());

        let empty = SendMessageRequest {
            content: String::new(),
            ..ok.clone()
        };
        assert!(empty.validate().is_err());

        let oversized = SendMessageRequest {
            content: "x".repeat(MAX_MESSAGE_LEN + 1),
            ..ok
        };
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn test_media_upload_validation() {
        let bad_size = MediaUpload {
            file_path: "pictures/a.png".to_string(),
            size_bytes: 0,
            extension: "png".to_string(),
        };
        assert!(bad_size.validate().is_err());
    }

    #[test]
    fn test_mark_read_requires_ids() {
        let empty = MarkReadRequest {
            message_ids: vec![],
        };
        assert!(empty.validate().is_err());
    }
}
