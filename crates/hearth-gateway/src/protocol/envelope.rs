//! The `{"action", "results"}` envelope
//!
//! Both directions share the envelope shape. Inbound actions form a
//! closed set per channel; anything else decodes to an explicit `Unknown`
//! variant, which the handlers log and ignore rather than erroring the
//! connection.

use hearth_core::EventKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use hearth_service::MediaUpload;

/// Errors while decoding a client frame
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("frame has no action field")]
    MissingAction,

    #[error("malformed payload for action '{action}': {reason}")]
    BadPayload { action: String, reason: String },
}

/// Outbound frame pushed to clients
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame {
    pub action: EventKind,
    pub results: Value,
}

impl OutboundFrame {
    /// Create a frame
    #[must_use]
    pub fn new(action: EventKind, results: Value) -> Self {
        Self { action, results }
    }

    /// The rejection frame sent when a single event fails
    #[must_use]
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            action: EventKind::Error,
            results: serde_json::json!({
                "code": code,
                "message": message,
            }),
        }
    }

    /// Serialize to JSON text
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Payload of an inbound `new_message`
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessagePayload {
    pub message: String,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub media: Vec<MediaUpload>,
}

/// Reference to a message by id
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

/// Inbound actions on the chat channel
#[derive(Debug, Clone)]
pub enum ChatClientAction {
    NewMessage(NewMessagePayload),
    DeleteMessage { message: String },
    ReadMessages { messages: Vec<MessageRef> },
    Typing,
    StopTyping,
    /// Unrecognized tag; logged and ignored
    Unknown(String),
}

impl ChatClientAction {
    /// Decode a chat-channel frame
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let (action, value) = split_envelope(text)?;

        match action.as_str() {
            "new_message" => Ok(Self::NewMessage(payload(&action, &value)?)),
            "delete_message" => {
                #[derive(Deserialize)]
                struct Payload {
                    message: String,
                }
                let p: Payload = payload(&action, &value)?;
                Ok(Self::DeleteMessage { message: p.message })
            }
            "read_messages" => {
                #[derive(Deserialize)]
                struct Payload {
                    messages: Vec<MessageRef>,
                }
                let p: Payload = payload(&action, &value)?;
                Ok(Self::ReadMessages {
                    messages: p.messages,
                })
            }
            "typing" => Ok(Self::Typing),
            "stop_typing" => Ok(Self::StopTyping),
            _ => Ok(Self::Unknown(action)),
        }
    }
}

/// Inbound actions on the presence channel
#[derive(Debug, Clone)]
pub enum PresenceClientAction {
    GetOrCreateRoom { dm: String },
    PullRooms,
    /// Unrecognized tag; logged and ignored
    Unknown(String),
}

impl PresenceClientAction {
    /// Decode a presence-channel frame
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let (action, value) = split_envelope(text)?;

        match action.as_str() {
            "get_or_create_room" => {
                #[derive(Deserialize)]
                struct Payload {
                    dm: String,
                }
                let p: Payload = payload(&action, &value)?;
                Ok(Self::GetOrCreateRoom { dm: p.dm })
            }
            "pull_rooms" => Ok(Self::PullRooms),
            _ => Ok(Self::Unknown(action)),
        }
    }
}

/// Pull the action tag out of a frame, keeping the rest for the payload
fn split_envelope(text: &str) -> Result<(String, Value), ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingAction)?
        .to_string();
    Ok((action, value))
}

/// Deserialize the remaining fields of the frame as the action's payload
fn payload<T: serde::de::DeserializeOwned>(
    action: &str,
    value: &Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(value.clone()).map_err(|e| ProtocolError::BadPayload {
        action: action.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_message() {
        let frame = r#"{"action":"new_message","message":"hi there","reply_to":"42"}"#;
        match ChatClientAction::parse(frame).unwrap() {
            ChatClientAction::NewMessage(p) => {
                assert_eq!(p.message, "hi there");
                assert_eq!(p.reply_to.as_deref(), Some("42"));
                assert!(p.media.is_empty());
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_parse_read_messages() {
        let frame = r#"{"action":"read_messages","messages":[{"id":"1"},{"id":"2"}]}"#;
        match ChatClientAction::parse(frame).unwrap() {
            ChatClientAction::ReadMessages { messages } => {
                assert_eq!(messages.len(), 2);
                assert_eq!(messages[0].id, "1");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_parse_typing_variants() {
        assert!(matches!(
            ChatClientAction::parse(r#"{"action":"typing"}"#).unwrap(),
            ChatClientAction::Typing
        ));
        assert!(matches!(
            ChatClientAction::parse(r#"{"action":"stop_typing"}"#).unwrap(),
            ChatClientAction::StopTyping
        ));
    }

    #[test]
    fn test_unknown_action_is_explicit() {
        match ChatClientAction::parse(r#"{"action":"dance"}"#).unwrap() {
            ChatClientAction::Unknown(tag) => assert_eq!(tag, "dance"),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_missing_action_is_an_error() {
        assert!(matches!(
            ChatClientAction::parse(r#"{"message":"hi"}"#),
            Err(ProtocolError::MissingAction)
        ));
    }

    #[test]
    fn test_bad_payload_is_an_error() {
        assert!(matches!(
            ChatClientAction::parse(r#"{"action":"delete_message"}"#),
            Err(ProtocolError::BadPayload { .. })
        ));
    }

    #[test]
    fn test_parse_presence_actions() {
        match PresenceClientAction::parse(r#"{"action":"get_or_create_room","dm":"7"}"#).unwrap() {
            PresenceClientAction::GetOrCreateRoom { dm } => assert_eq!(dm, "7"),
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(matches!(
            PresenceClientAction::parse(r#"{"action":"pull_rooms"}"#).unwrap(),
            PresenceClientAction::PullRooms
        ));
    }

    #[test]
    fn test_outbound_frame_shape() {
        let frame = OutboundFrame::new(EventKind::PullRooms, serde_json::json!([]));
        let json = frame.to_json().unwrap();
        assert_eq!(json, r#"{"action":"pull_rooms","results":[]}"#);
    }
}
