//! WebSocket upgrade handlers
//!
//! Authentication happens before the upgrade: the access token arrives as
//! a `?token=` query parameter and a bad token turns into a plain 401,
//! never an open socket. The chat channel additionally requires the
//! caller to be a participant of the room it names.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use hearth_core::{EventKind, Snowflake};
use hearth_service::{MessageService, PresenceService};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::handlers::{handle_chat_frame, handle_presence_frame, push_room_list};
use crate::protocol::OutboundFrame;
use crate::server::GatewayState;

/// Outbound queue depth per connection
const FRAME_BUFFER_SIZE: usize = 100;

/// Messages pushed as history when a chat connection opens
const HISTORY_LIMIT: i64 = 25;

#[derive(Debug, Deserialize)]
pub(crate) struct TokenQuery {
    token: Option<String>,
}

/// Upgrade handler for `/ws/presence`
pub(crate) async fn presence_handler(
    State(state): State<GatewayState>,
    Query(query): Query<TokenQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let user_id = match authenticate(&state, query.token.as_deref()) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    ws.on_upgrade(move |socket| presence_socket(state, socket, user_id))
        .into_response()
}

/// Upgrade handler for `/ws/chat/:room_id`
pub(crate) async fn chat_handler(
    State(state): State<GatewayState>,
    Path(room_id): Path<String>,
    Query(query): Query<TokenQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let user_id = match authenticate(&state, query.token.as_deref()) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    let Ok(room_id) = Snowflake::parse(&room_id) else {
        return (StatusCode::BAD_REQUEST, "invalid room id").into_response();
    };

    // Membership is checked on every entry point, the upgrade included
    let ctx = state.service_context();
    match ctx.room_repo().find_by_id(room_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return (StatusCode::NOT_FOUND, "unknown room").into_response(),
        Err(e) => {
            warn!(error = %e, "Room lookup failed during upgrade");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }
    match ctx.room_repo().is_participant(room_id, user_id).await {
        Ok(true) => {}
        Ok(false) => return (StatusCode::FORBIDDEN, "not a participant").into_response(),
        Err(e) => {
            warn!(error = %e, "Participant check failed during upgrade");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    ws.on_upgrade(move |socket| chat_socket(state, socket, user_id, room_id))
        .into_response()
}

fn authenticate(state: &GatewayState, token: Option<&str>) -> Result<Snowflake, Response> {
    let Some(token) = token else {
        return Err((StatusCode::UNAUTHORIZED, "missing token").into_response());
    };

    state
        .service_context()
        .token_service()
        .validate(token)
        .and_then(|claims| claims.user_id())
        .map_err(|e| {
            debug!(error = %e, "WebSocket upgrade rejected");
            (StatusCode::UNAUTHORIZED, "invalid token").into_response()
        })
}

/// Serve a presence connection until it closes
async fn presence_socket(state: GatewayState, socket: WebSocket, user_id: Snowflake) {
    let (connection, rx) = open_connection(&state, user_id);
    let session_id = connection.session_id().to_string();

    info!(session_id = %session_id, user_id = %user_id, "Presence connection established");

    state.connection_manager().join_user_group(&session_id);
    state.event_dispatcher().watch_user(user_id).await;

    // Explicit presence-service call; flipping the flag is not a side
    // effect hidden in connection plumbing
    if let Err(e) = PresenceService::new(state.service_context())
        .connected(user_id)
        .await
    {
        warn!(user_id = %user_id, error = %e, "Failed to mark user online");
    }

    push_room_list(&state, &connection).await;

    let mut receiver = run_socket(socket, rx);
    while let Some(frame) = receiver.recv().await {
        handle_presence_frame(&state, &connection, &frame).await;
    }

    // Cleanup
    state.connection_manager().remove(&session_id);

    if state.connection_manager().user_connection_count(user_id) == 0 {
        state.event_dispatcher().unwatch_user(user_id).await;

        if let Err(e) = PresenceService::new(state.service_context())
            .disconnected(user_id)
            .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to mark user offline");
        }
    }

    info!(session_id = %session_id, user_id = %user_id, "Presence connection closed");
}

/// Serve a chat connection until it closes
async fn chat_socket(state: GatewayState, socket: WebSocket, user_id: Snowflake, room_id: Snowflake) {
    let (connection, rx) = open_connection(&state, user_id);
    let session_id = connection.session_id().to_string();

    info!(session_id = %session_id, user_id = %user_id, room_id = %room_id, "Chat connection established");

    state.connection_manager().join_room(&session_id, room_id);
    state.event_dispatcher().watch_room(room_id).await;

    push_history(&state, &connection, user_id, room_id).await;

    let mut receiver = run_socket(socket, rx);
    while let Some(frame) = receiver.recv().await {
        handle_chat_frame(&state, &connection, room_id, &frame).await;
    }

    // Cleanup
    state.connection_manager().leave_room(&session_id, room_id);
    state.connection_manager().remove(&session_id);

    if state.connection_manager().room_connection_count(room_id) == 0 {
        state.event_dispatcher().unwatch_room(room_id).await;
    }

    info!(session_id = %session_id, room_id = %room_id, "Chat connection closed");
}

/// Register a connection with the manager and hand back its frame queue
fn open_connection(
    state: &GatewayState,
    user_id: Snowflake,
) -> (Arc<Connection>, mpsc::Receiver<OutboundFrame>) {
    let (tx, rx) = mpsc::channel(FRAME_BUFFER_SIZE);
    let connection = Arc::new(Connection::new(user_id, tx));
    state.connection_manager().admit(connection.clone());
    (connection, rx)
}

/// Push the latest messages of the room as `pull_history`
async fn push_history(
    state: &GatewayState,
    connection: &Arc<Connection>,
    user_id: Snowflake,
    room_id: Snowflake,
) {
    match MessageService::new(state.service_context())
        .room_history(user_id, room_id, HISTORY_LIMIT)
        .await
    {
        Ok(messages) => {
            let frame = OutboundFrame::new(
                EventKind::PullHistory,
                serde_json::to_value(&messages).unwrap_or_default(),
            );
            connection.send(frame);
        }
        Err(e) => {
            warn!(room_id = %room_id, error = %e, "History fetch failed");
            connection.send(OutboundFrame::error(e.error_code(), &e.to_string()));
        }
    }
}

/// Split the socket into reader and writer tasks.
///
/// The writer drains the connection's frame queue; the reader forwards
/// text frames into the returned channel and ends it on close or error,
/// which is the caller's signal to clean up.
fn run_socket(socket: WebSocket, mut frames: mpsc::Receiver<OutboundFrame>) -> mpsc::Receiver<String> {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let (text_tx, text_rx) = mpsc::channel::<String>(FRAME_BUFFER_SIZE);

    // Writer: frame queue -> socket
    tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            match frame.to_json() {
                Ok(json) => {
                    if ws_sink.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to serialize outbound frame");
                }
            }
        }
        let _ = ws_sink.close().await;
    });

    // Reader: socket -> text channel
    tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if text_tx.send(text.to_string()).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Binary(_)) => {
                    debug!("Binary frames not supported, ignoring");
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    debug!(error = %e, "WebSocket read error");
                    break;
                }
            }
        }
        // Dropping text_tx ends the handler loop
    });

    text_rx
}
