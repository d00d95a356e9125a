//! Chat channel handler
//!
//! One frame in, at most one rejection out: service failures reject the
//! single event and the connection stays open. Successful operations
//! reach this connection through the pub/sub round trip rather than a
//! direct reply, so every participant sees the same stream.

use std::sync::Arc;

use hearth_core::Snowflake;
use hearth_service::{
    MessageService, ReadStateService, SendMessageRequest, ServiceError,
};
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::protocol::{ChatClientAction, OutboundFrame, ProtocolError};
use crate::server::GatewayState;

/// Handle one text frame on a chat-channel connection
pub async fn handle_chat_frame(
    state: &GatewayState,
    connection: &Arc<Connection>,
    room_id: Snowflake,
    text: &str,
) {
    let action = match ChatClientAction::parse(text) {
        Ok(action) => action,
        Err(e) => {
            reject(connection, &e);
            return;
        }
    };

    let user_id = connection.user_id();
    let ctx = state.service_context();

    let result = match action {
        ChatClientAction::NewMessage(payload) => {
            let request = SendMessageRequest {
                room_id: room_id.to_string(),
                content: payload.message,
                reply_to: payload.reply_to,
                media: payload.media,
            };
            MessageService::new(ctx)
                .send_message(user_id, request)
                .await
                .map(|_| ())
        }
        ChatClientAction::DeleteMessage { message } => match Snowflake::parse(&message) {
            Ok(id) => MessageService::new(ctx).delete_message(user_id, id).await,
            Err(_) => Err(ServiceError::validation(format!("invalid id: {message}"))),
        },
        ChatClientAction::ReadMessages { messages } => {
            let ids: Vec<String> = messages.into_iter().map(|m| m.id).collect();
            ReadStateService::new(ctx)
                .mark_read(user_id, &ids)
                .await
                .map(|_| ())
        }
        ChatClientAction::Typing => ReadStateService::new(ctx).typing(user_id, room_id).await,
        ChatClientAction::StopTyping => {
            ReadStateService::new(ctx).stop_typing(user_id, room_id).await
        }
        ChatClientAction::Unknown(tag) => {
            debug!(session_id = %connection.session_id(), action = %tag, "Unknown chat action ignored");
            return;
        }
    };

    if let Err(e) = result {
        warn!(
            session_id = %connection.session_id(),
            room_id = %room_id,
            error = %e,
            "Chat event rejected"
        );
        connection.send(OutboundFrame::error(e.error_code(), &e.to_string()));
    }
}

fn reject(connection: &Arc<Connection>, error: &ProtocolError) {
    debug!(session_id = %connection.session_id(), error = %error, "Malformed chat frame");
    connection.send(OutboundFrame::error("BAD_FRAME", &error.to_string()));
}
