//! `/api/socket` - operator messages over REST and live connection stats.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::adapters::websocket::RoomManager;
use crate::application::handlers::realtime::{
    SendEmergencyCommand, SendEmergencyHandler, SendTableMessageCommand, SendTableMessageHandler,
};
use crate::domain::foundation::{Role, TableId};
use crate::domain::realtime::Room;
use crate::ports::ConnectionRegistry;

use super::error::ApiError;
use super::middleware::RequireAuth;
use super::parse_id;
use super::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct EmergencyRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TableMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Delivered {
    pub delivered: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketStats {
    pub connections: usize,
    pub users_by_role: HashMap<Role, usize>,
    pub rooms: Vec<RoomStats>,
}

#[derive(Debug, Serialize)]
pub struct RoomStats {
    pub room: Room,
    pub members: usize,
}

#[derive(Clone)]
pub struct SocketHandlers {
    pub emergency: Arc<SendEmergencyHandler>,
    pub table_message: Arc<SendTableMessageHandler>,
    pub registry: Arc<dyn ConnectionRegistry>,
    pub rooms: Arc<RoomManager>,
}

/// POST /api/socket/emergency
pub async fn send_emergency(
    State(handlers): State<SocketHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<EmergencyRequest>,
) -> Result<ApiResponse<Delivered>, ApiError> {
    let delivered = handlers
        .emergency
        .handle(
            SendEmergencyCommand {
                message: req.message,
            },
            &user,
        )
        .await?;
    Ok(ApiResponse::ok(Delivered { delivered }))
}

/// POST /api/socket/tables/:id/message
pub async fn send_table_message(
    State(handlers): State<SocketHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<TableMessageRequest>,
) -> Result<ApiResponse<Delivered>, ApiError> {
    let table_id: TableId = parse_id(&id, "table id")?;
    let delivered = handlers
        .table_message
        .handle(
            SendTableMessageCommand {
                table_id,
                message: req.message,
            },
            &user,
        )
        .await?;
    Ok(ApiResponse::ok(Delivered { delivered }))
}

/// GET /api/socket/stats
pub async fn socket_stats(
    State(handlers): State<SocketHandlers>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<SocketStats>, ApiError> {
    user.require_any(&[Role::Admin, Role::Manager])?;

    let mut rooms = Vec::new();
    for room in handlers.rooms.active_rooms().await {
        let members = handlers.rooms.member_count(&room).await;
        rooms.push(RoomStats { room, members });
    }
    Ok(ApiResponse::ok(SocketStats {
        connections: handlers.rooms.connection_count().await,
        users_by_role: handlers.registry.count_by_role().await,
        rooms,
    }))
}

pub fn socket_routes(handlers: SocketHandlers) -> Router {
    Router::new()
        .route("/emergency", post(send_emergency))
        .route("/tables/:id/message", post(send_table_message))
        .route("/stats", get(socket_stats))
        .with_state(handlers)
}
