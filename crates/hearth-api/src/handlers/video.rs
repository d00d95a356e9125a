//! Video call handlers

use axum::{extract::State, Json};
use hearth_service::{VideoJoinResponse, VideoService};
use serde::Deserialize;

use crate::extractors::AuthUser;
use crate::response::{parse_path_id, ApiResult, NoContent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallRequest {
    pub room_id: String,
}

/// Join (or lazily start) a room's video call; returns the signed join
/// token, the media server URL and the ICE server list
///
/// POST /video/token
pub async fn join_call(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CallRequest>,
) -> ApiResult<Json<VideoJoinResponse>> {
    let room_id = parse_path_id(&request.room_id)?;
    let response = VideoService::new(state.service_context())
        .join_call(auth.user_id, room_id)
        .await?;
    Ok(Json(response))
}

/// End a room's call
///
/// POST /video/end
pub async fn end_call(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CallRequest>,
) -> ApiResult<NoContent> {
    let room_id = parse_path_id(&request.room_id)?;
    VideoService::new(state.service_context())
        .end_call(auth.user_id, room_id)
        .await?;
    Ok(NoContent)
}
