//! Video call entity - one call per room, created lazily on first join

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Call lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Ongoing,
    Ended,
}

impl CallStatus {
    /// Storage representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Ended => "ended",
        }
    }

    /// Parse the storage representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ongoing" => Some(Self::Ongoing),
            "ended" => Some(Self::Ended),
            _ => None,
        }
    }
}

/// Video call entity, one-to-one with a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCall {
    pub id: Snowflake,
    pub room_id: Snowflake,
    pub status: CallStatus,
    pub created_by: Snowflake,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl VideoCall {
    /// Start a call in a room
    pub fn start(id: Snowflake, room_id: Snowflake, created_by: Snowflake) -> Self {
        Self {
            id,
            room_id,
            status: CallStatus::Ongoing,
            created_by,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// End the call
    pub fn end(&mut self) {
        self.status = CallStatus::Ended;
        self.ended_at = Some(Utc::now());
    }

    #[inline]
    pub fn is_ongoing(&self) -> bool {
        self.status == CallStatus::Ongoing
    }
}

/// STUN/TURN server entry handed to clients with a join token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    pub id: Snowflake,
    pub urls: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    pub priority: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_lifecycle() {
        let mut call = VideoCall::start(Snowflake::new(1), Snowflake::new(5), Snowflake::new(10));
        assert!(call.is_ongoing());
        assert!(call.ended_at.is_none());

        call.end();
        assert!(!call.is_ongoing());
        assert_eq!(call.status, CallStatus::Ended);
        assert!(call.ended_at.is_some());
    }

    #[test]
    fn test_call_status_roundtrip() {
        for s in [CallStatus::Ongoing, CallStatus::Ended] {
            assert_eq!(CallStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(CallStatus::parse("paused"), None);
    }
}
