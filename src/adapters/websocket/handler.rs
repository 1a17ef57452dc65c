//! WebSocket upgrade and connection lifecycle.
//!
//! 1. Resolve identity from `?token=` or `Authorization: Bearer` (missing or
//!    demo token → guest)
//! 2. Upgrade, register the connection, join the role's rooms
//! 3. Forward queued frames to the socket; handle client frames
//! 4. On close, leave every room and unregister

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;

use crate::application::handlers::realtime::{
    SendEmergencyCommand, SendEmergencyHandler, SendTableMessageCommand, SendTableMessageHandler,
};
use crate::config::RealtimeConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, ConnectionId};
use crate::domain::realtime::{rooms_for_role, Room};
use crate::ports::{ConnectionInfo, ConnectionRegistry, TokenVerifier};

use super::messages::{ClientMessage, ServerMessage};
use super::rooms::RoomManager;

#[derive(Clone)]
pub struct WebSocketState {
    pub registry: Arc<dyn ConnectionRegistry>,
    pub rooms: Arc<RoomManager>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub config: RealtimeConfig,
    pub emergency: Arc<SendEmergencyHandler>,
    pub table_messages: Arc<SendTableMessageHandler>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

impl WebSocketState {
    /// Guest identity for no token or the demo sentinel; otherwise the token
    /// must verify.
    pub async fn resolve_identity(
        &self,
        token: Option<&str>,
    ) -> Result<AuthenticatedUser, AuthError> {
        if self.config.is_guest_token(token) {
            return Ok(AuthenticatedUser::guest(self.config.guest_role));
        }
        self.verifier.verify(token.unwrap_or_default().trim()).await
    }

    /// Registers the connection and joins its role rooms. Returns the rooms.
    pub async fn attach(
        &self,
        connection_id: ConnectionId,
        user: &AuthenticatedUser,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Vec<Room> {
        self.registry
            .register(ConnectionInfo::new(connection_id, user))
            .await;
        self.rooms
            .connect(connection_id, sender, rooms_for_role(user.role))
            .await;
        self.rooms.rooms_of(&connection_id).await
    }

    pub async fn detach(&self, connection_id: &ConnectionId, user: &AuthenticatedUser) {
        self.rooms.disconnect(connection_id).await;
        self.registry.unregister(&user.id, connection_id).await;
    }

    /// Handles one inbound text frame. Replies go to the sender's own queue.
    pub async fn on_client_text(
        &self,
        connection_id: ConnectionId,
        user: &AuthenticatedUser,
        text: &str,
    ) {
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    error = %e,
                    "Unreadable client frame"
                );
                self.reply(connection_id, ServerMessage::error("INVALID_MESSAGE", e.to_string()))
                    .await;
                return;
            }
        };

        let reply = match message {
            ClientMessage::Ping => ServerMessage::pong(),
            ClientMessage::JoinTable { table_id } => {
                let room = Room::Table(table_id);
                self.rooms.join(connection_id, room).await;
                ServerMessage::Joined { room }
            }
            ClientMessage::LeaveTable { table_id } => {
                let room = Room::Table(table_id);
                self.rooms.leave(&connection_id, &room).await;
                ServerMessage::Left { room }
            }
            ClientMessage::Emergency { message } => {
                match self
                    .emergency
                    .handle(SendEmergencyCommand { message }, user)
                    .await
                {
                    Ok(_) => return,
                    Err(e) => ServerMessage::error(e.code().to_string(), e.to_string()),
                }
            }
            ClientMessage::TableMessage { table_id, message } => {
                match self
                    .table_messages
                    .handle(SendTableMessageCommand { table_id, message }, user)
                    .await
                {
                    Ok(_) => return,
                    Err(e) => ServerMessage::error(e.code().to_string(), e.to_string()),
                }
            }
        };
        self.reply(connection_id, reply).await;
    }

    async fn reply(&self, connection_id: ConnectionId, message: ServerMessage) {
        self.rooms.send_to(&connection_id, message).await;
    }
}

/// `GET /ws?token=...`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    State(state): State<WebSocketState>,
) -> Response {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    let token = params.token.or(bearer);

    let user = match state.resolve_identity(token.as_deref()).await {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, "WebSocket upgrade refused");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "error": "UNAUTHORIZED",
                    "message": e.to_string(),
                })),
            )
                .into_response();
        }
    };

    let max_frame = state.config.max_frame_bytes;
    ws.max_message_size(max_frame)
        .on_upgrade(move |socket| handle_socket(socket, user, state))
}

async fn handle_socket(socket: WebSocket, user: AuthenticatedUser, state: WebSocketState) {
    let (mut sink, mut stream) = socket.split();
    let connection_id = ConnectionId::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let rooms = state.attach(connection_id, &user, tx).await;
    tracing::info!(
        connection_id = %connection_id,
        user_id = %user.id,
        role = %user.role,
        rooms = rooms.len(),
        "Client connected"
    );
    state
        .rooms
        .send_to(
            &connection_id,
            ServerMessage::Connected {
                connection_id,
                user_id: user.id.clone(),
                role: user.role,
                rooms,
            },
        )
        .await;

    let mut writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize server frame");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let reader_state = state.clone();
    let reader_user = user.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    reader_state
                        .on_client_text(connection_id, &reader_user, &text)
                        .await;
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "Receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    state.detach(&connection_id, &user).await;
    tracing::info!(connection_id = %connection_id, user_id = %user.id, "Client disconnected");
}

pub fn websocket_router() -> Router<WebSocketState> {
    Router::new().route("/ws", get(ws_handler))
}
