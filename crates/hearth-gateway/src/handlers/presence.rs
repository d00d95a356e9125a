//! Presence channel handler
//!
//! Serves the room list and private-room resolution. Responses go
//! straight back on the requesting connection; room membership changes
//! reach other participants through their own `pull_rooms` refreshes.

use std::sync::Arc;

use hearth_core::{EventKind, Snowflake};
use hearth_service::{RoomService, ServiceError};
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::protocol::{OutboundFrame, PresenceClientAction, ProtocolError};
use crate::server::GatewayState;

/// Handle one text frame on a presence-channel connection
pub async fn handle_presence_frame(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) {
    let action = match PresenceClientAction::parse(text) {
        Ok(action) => action,
        Err(e) => {
            reject(connection, &e);
            return;
        }
    };

    match action {
        PresenceClientAction::GetOrCreateRoom { dm } => {
            get_or_create_room(state, connection, &dm).await;
        }
        PresenceClientAction::PullRooms => {
            push_room_list(state, connection).await;
        }
        PresenceClientAction::Unknown(tag) => {
            debug!(session_id = %connection.session_id(), action = %tag, "Unknown presence action ignored");
        }
    }
}

/// Resolve (or create) the private room with another user and push it
/// back as a `single_room` frame
async fn get_or_create_room(state: &GatewayState, connection: &Arc<Connection>, dm: &str) {
    let result = match Snowflake::parse(dm) {
        Ok(other) => {
            RoomService::new(state.service_context())
                .get_or_create_private(connection.user_id(), other)
                .await
        }
        Err(_) => Err(ServiceError::validation(format!("invalid id: {dm}"))),
    };

    match result {
        Ok(room) => {
            let frame = OutboundFrame::new(
                EventKind::SingleRoom,
                serde_json::to_value(&room).unwrap_or_default(),
            );
            connection.send(frame);
        }
        Err(e) => {
            warn!(
                session_id = %connection.session_id(),
                error = %e,
                "get_or_create_room rejected"
            );
            connection.send(OutboundFrame::error(e.error_code(), &e.to_string()));
        }
    }
}

/// Push the caller's full room list as a `pull_rooms` frame
pub async fn push_room_list(state: &GatewayState, connection: &Arc<Connection>) {
    match RoomService::new(state.service_context())
        .rooms_for_user(connection.user_id())
        .await
    {
        Ok(rooms) => {
            let frame = OutboundFrame::new(
                EventKind::PullRooms,
                serde_json::to_value(&rooms).unwrap_or_default(),
            );
            connection.send(frame);
        }
        Err(e) => {
            warn!(
                session_id = %connection.session_id(),
                error = %e,
                "Room list fetch failed"
            );
            connection.send(OutboundFrame::error(e.error_code(), &e.to_string()));
        }
    }
}

fn reject(connection: &Arc<Connection>, error: &ProtocolError) {
    debug!(session_id = %connection.session_id(), error = %error, "Malformed presence frame");
    connection.send(OutboundFrame::error("BAD_FRAME", &error.to_string()));
}
