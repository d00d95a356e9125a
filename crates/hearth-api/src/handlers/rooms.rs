//! Room handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use hearth_service::{
    AddParticipantsRequest, CreateGroupRequest, MessageResponse, MessageService,
    RemoveParticipantsRequest, RoomResponse, RoomService, TransferOwnershipRequest,
    UpdateRoomRequest,
};
use serde::Deserialize;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{parse_path_id, ApiResult, Created, NoContent};
use crate::state::AppState;

/// List rooms the caller participates in
///
/// GET /rooms
pub async fn list_rooms(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<RoomResponse>>> {
    let rooms = RoomService::new(state.service_context())
        .rooms_for_user(auth.user_id)
        .await?;
    Ok(Json(rooms))
}

/// Get one room
///
/// GET /rooms/{room_id}
pub async fn get_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
) -> ApiResult<Json<RoomResponse>> {
    let room_id = parse_path_id(&room_id)?;
    let room = RoomService::new(state.service_context())
        .room_for_user(auth.user_id, room_id)
        .await?;
    Ok(Json(room))
}

/// Find or create the private room with another user
///
/// POST /rooms/private/{user_id}
pub async fn get_or_create_private(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<RoomResponse>> {
    let other = parse_path_id(&user_id)?;
    let room = RoomService::new(state.service_context())
        .get_or_create_private(auth.user_id, other)
        .await?;
    Ok(Json(room))
}

/// Create a group room
///
/// POST /rooms/group
pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> ApiResult<Created<Json<RoomResponse>>> {
    let room = RoomService::new(state.service_context())
        .create_group(auth.user_id, request)
        .await?;
    Ok(Created(Json(room)))
}

/// Update a room's presentation fields
///
/// PATCH /rooms/{room_id}
pub async fn update_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateRoomRequest>,
) -> ApiResult<Json<RoomResponse>> {
    let room_id = parse_path_id(&room_id)?;
    let room = RoomService::new(state.service_context())
        .update_info(auth.user_id, room_id, request)
        .await?;
    Ok(Json(room))
}

/// Add participants
///
/// POST /rooms/{room_id}/participants
pub async fn add_participants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddParticipantsRequest>,
) -> ApiResult<Json<RoomResponse>> {
    let room_id = parse_path_id(&room_id)?;
    let room = RoomService::new(state.service_context())
        .add_participants(auth.user_id, room_id, &request.user_ids)
        .await?;
    Ok(Json(room))
}

/// Remove participants
///
/// DELETE /rooms/{room_id}/participants
pub async fn remove_participants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
    ValidatedJson(request): ValidatedJson<RemoveParticipantsRequest>,
) -> ApiResult<Json<RoomResponse>> {
    let room_id = parse_path_id(&room_id)?;
    let room = RoomService::new(state.service_context())
        .remove_participants(auth.user_id, room_id, &request.user_ids)
        .await?;
    Ok(Json(room))
}

/// Leave a room
///
/// POST /rooms/{room_id}/leave
pub async fn leave_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
) -> ApiResult<NoContent> {
    let room_id = parse_path_id(&room_id)?;
    RoomService::new(state.service_context())
        .leave(auth.user_id, room_id)
        .await?;
    Ok(NoContent)
}

/// Transfer room ownership
///
/// POST /rooms/{room_id}/transfer
pub async fn transfer_ownership(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
    Json(request): Json<TransferOwnershipRequest>,
) -> ApiResult<Json<RoomResponse>> {
    let room_id = parse_path_id(&room_id)?;
    let new_owner = parse_path_id(&request.new_owner_id)?;
    let room = RoomService::new(state.service_context())
        .transfer_ownership(auth.user_id, room_id, new_owner)
        .await?;
    Ok(Json(room))
}

/// Delete a room
///
/// DELETE /rooms/{room_id}
pub async fn delete_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
) -> ApiResult<NoContent> {
    let room_id = parse_path_id(&room_id)?;
    RoomService::new(state.service_context())
        .delete(auth.user_id, room_id)
        .await?;
    Ok(NoContent)
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    50
}

/// Recent messages of a room
///
/// GET /rooms/{room_id}/messages
pub async fn room_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let room_id = parse_path_id(&room_id)?;
    let messages = MessageService::new(state.service_context())
        .room_history(auth.user_id, room_id, query.limit)
        .await?;
    Ok(Json(messages))
}
