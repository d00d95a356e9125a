//! Friendship handlers

use axum::{
    extract::{Path, State},
    Json,
};
use hearth_service::{FriendshipResponse, FriendshipService, UserResponse};

use crate::extractors::AuthUser;
use crate::response::{parse_path_id, ApiResult, Created, NoContent};
use crate::state::AppState;

/// List own friends
///
/// GET /friends
pub async fn list_friends(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let friends = FriendshipService::new(state.service_context())
        .list_friends(auth.user_id)
        .await?;
    Ok(Json(friends))
}

/// List incoming friend requests
///
/// GET /friends/requests
pub async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<FriendshipResponse>>> {
    let requests = FriendshipService::new(state.service_context())
        .incoming_requests(auth.user_id)
        .await?;
    Ok(Json(requests))
}

/// Send a friend request
///
/// POST /friends/{user_id}/request
pub async fn send_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Created<Json<FriendshipResponse>>> {
    let to = parse_path_id(&user_id)?;
    let response = FriendshipService::new(state.service_context())
        .send_request(auth.user_id, to)
        .await?;
    Ok(Created(Json(response)))
}

/// Accept a pending request from the named user
///
/// POST /friends/{user_id}/accept
pub async fn accept_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<NoContent> {
    let from = parse_path_id(&user_id)?;
    FriendshipService::new(state.service_context())
        .accept(auth.user_id, from)
        .await?;
    Ok(NoContent)
}

/// Decline a pending request from the named user
///
/// POST /friends/{user_id}/decline
pub async fn decline_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<NoContent> {
    let from = parse_path_id(&user_id)?;
    FriendshipService::new(state.service_context())
        .decline(auth.user_id, from)
        .await?;
    Ok(NoContent)
}

/// Remove an existing friendship
///
/// DELETE /friends/{user_id}
pub async fn remove_friend(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<NoContent> {
    let friend = parse_path_id(&user_id)?;
    FriendshipService::new(state.service_context())
        .remove(auth.user_id, friend)
        .await?;
    Ok(NoContent)
}
