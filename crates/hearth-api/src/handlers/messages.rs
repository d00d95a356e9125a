//! Message handlers

use axum::{
    extract::{Path, State},
    Json,
};
use hearth_service::{
    EditMessageRequest, MarkReadRequest, MessageResponse, MessageService, ReadStateService,
    SendMessageRequest,
};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{parse_path_id, ApiResult, Created, NoContent};
use crate::state::AppState;

/// Send a message (with optional media references)
///
/// POST /messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let response = MessageService::new(state.service_context())
        .send_message(auth.user_id, request)
        .await?;
    Ok(Created(Json(response)))
}

/// Edit own message
///
/// PATCH /messages/{message_id}
pub async fn edit_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
    ValidatedJson(request): ValidatedJson<EditMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let message_id = parse_path_id(&message_id)?;
    let response = MessageService::new(state.service_context())
        .edit_message(auth.user_id, message_id, request.content)
        .await?;
    Ok(Json(response))
}

/// Delete a message (authorized actors only)
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
) -> ApiResult<NoContent> {
    let message_id = parse_path_id(&message_id)?;
    MessageService::new(state.service_context())
        .delete_message(auth.user_id, message_id)
        .await?;
    Ok(NoContent)
}

/// Mark messages as read
///
/// POST /messages/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<MarkReadRequest>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let updated = ReadStateService::new(state.service_context())
        .mark_read(auth.user_id, &request.message_ids)
        .await?;
    Ok(Json(updated))
}
