//! Route definitions
//!
//! All routes live under /api/v1 except the health probes.

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{accounts, families, friends, health, messages, rooms, video};
use crate::state::AppState;

/// Create the main API router (health excluded so it bypasses rate
/// limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(account_routes())
        .merge(friend_routes())
        .merge(room_routes())
        .merge(message_routes())
        .merge(family_routes())
        .merge(video_routes())
}

/// Account routes
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/users/@me", get(accounts::get_me))
        .route("/users/@me", patch(accounts::update_me))
        .route("/users/@me/verification-email", post(accounts::send_verification_email))
        .route("/users/:user_id", get(accounts::get_user))
        .route("/verify-email/:token", get(accounts::verify_email))
}

/// Friendship routes
fn friend_routes() -> Router<AppState> {
    Router::new()
        .route("/friends", get(friends::list_friends))
        .route("/friends/requests", get(friends::list_requests))
        .route("/friends/:user_id/request", post(friends::send_request))
        .route("/friends/:user_id/accept", post(friends::accept_request))
        .route("/friends/:user_id/decline", post(friends::decline_request))
        .route("/friends/:user_id", delete(friends::remove_friend))
}

/// Room routes
fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(rooms::list_rooms))
        .route("/rooms/group", post(rooms::create_group))
        .route("/rooms/private/:user_id", post(rooms::get_or_create_private))
        .route("/rooms/:room_id", get(rooms::get_room))
        .route("/rooms/:room_id", patch(rooms::update_room))
        .route("/rooms/:room_id", delete(rooms::delete_room))
        .route("/rooms/:room_id/participants", post(rooms::add_participants))
        .route("/rooms/:room_id/participants", delete(rooms::remove_participants))
        .route("/rooms/:room_id/leave", post(rooms::leave_room))
        .route("/rooms/:room_id/transfer", post(rooms::transfer_ownership))
        .route("/rooms/:room_id/messages", get(rooms::room_messages))
}

/// Message routes
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(messages::send_message))
        .route("/messages/read", post(messages::mark_read))
        .route("/messages/:message_id", patch(messages::edit_message))
        .route("/messages/:message_id", delete(messages::delete_message))
}

/// Family routes
fn family_routes() -> Router<AppState> {
    Router::new()
        .route("/families", post(families::create_family))
        .route("/families/join", post(families::join_family))
        .route("/families/:family_id", get(families::get_family))
        .route("/families/:family_id", patch(families::rename_family))
        .route("/families/:family_id", delete(families::delete_family))
        .route("/families/:family_id/members", post(families::add_member))
        .route("/families/:family_id/members/:user_id", delete(families::remove_member))
        .route("/families/:family_id/admins/:user_id", post(families::promote_admin))
        .route("/families/:family_id/admins/:user_id", delete(families::demote_admin))
        .route("/families/:family_id/invite-code", post(families::rotate_invite_code))
}

/// Video call routes
fn video_routes() -> Router<AppState> {
    Router::new()
        .route("/video/token", post(video::join_call))
        .route("/video/end", post(video::end_call))
}
