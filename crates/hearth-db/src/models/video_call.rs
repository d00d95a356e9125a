//! Video call database models

use chrono::{DateTime, Utc};
use hearth_core::{CallStatus, IceServer, Snowflake, VideoCall};
use sqlx::FromRow;

/// Database model for the video_calls table
#[derive(Debug, Clone, FromRow)]
pub struct VideoCallModel {
    pub id: i64,
    pub room_id: i64,
    pub status: String,
    pub created_by: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl From<VideoCallModel> for VideoCall {
    fn from(m: VideoCallModel) -> Self {
        VideoCall {
            id: Snowflake::new(m.id),
            room_id: Snowflake::new(m.room_id),
            status: CallStatus::parse(&m.status).unwrap_or(CallStatus::Ended),
            created_by: Snowflake::new(m.created_by),
            started_at: m.started_at,
            ended_at: m.ended_at,
        }
    }
}

/// Database model for the ice_servers table
#[derive(Debug, Clone, FromRow)]
pub struct IceServerModel {
    pub id: i64,
    pub urls: String,
    pub username: Option<String>,
    pub credential: Option<String>,
    pub priority: i32,
    pub is_active: bool,
}

impl From<IceServerModel> for IceServer {
    fn from(m: IceServerModel) -> Self {
        IceServer {
            id: Snowflake::new(m.id),
            urls: m.urls,
            username: m.username,
            credential: m.credential,
            priority: m.priority,
        }
    }
}
