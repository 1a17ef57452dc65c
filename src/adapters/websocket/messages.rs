//! WebSocket frame protocol.
//!
//! - Server → Client: `connected`, `notification`, `joined`, `left`,
//!   `error`, `pong`
//! - Client → Server: `ping`, `join_table`, `leave_table`, `emergency`,
//!   `table_message`
//!
//! Both directions are JSON objects tagged by `type`.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConnectionId, Role, TableId, Timestamp, UserId};
use crate::domain::realtime::{Notification, Room};

// ============================================
// Server → Client Messages
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Connected {
        connection_id: ConnectionId,
        user_id: UserId,
        role: Role,
        rooms: Vec<Room>,
    },

    /// `event` is the wire name (`new-order`, `low-stock`, ...).
    Notification {
        event: String,
        room: Room,
        notification: Notification,
    },

    Joined { room: Room },

    Left { room: Room },

    Error { code: String, message: String },

    Pong { timestamp: String },
}

impl ServerMessage {
    pub fn notification(room: Room, notification: Notification) -> Self {
        ServerMessage::Notification {
            event: notification.kind.event_name().to_string(),
            room,
            notification,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn pong() -> Self {
        ServerMessage::Pong {
            timestamp: Timestamp::now().to_iso_string(),
        }
    }
}

// ============================================
// Client → Server Messages
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,

    #[serde(rename_all = "camelCase")]
    JoinTable { table_id: TableId },

    #[serde(rename_all = "camelCase")]
    LeaveTable { table_id: TableId },

    Emergency { message: String },

    #[serde(rename_all = "camelCase")]
    TableMessage { table_id: TableId, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::realtime::{NotificationType, Priority};
    use serde_json::json;

    #[test]
    fn client_frames_parse_from_wire_shape() {
        let table_id = TableId::new();
        let join: ClientMessage =
            serde_json::from_value(json!({ "type": "join_table", "tableId": table_id })).unwrap();
        assert_eq!(join, ClientMessage::JoinTable { table_id });

        let msg: ClientMessage = serde_json::from_value(
            json!({ "type": "table_message", "tableId": table_id, "message": "hi" }),
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::TableMessage { .. }));

        let ping: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(ping, ClientMessage::Ping);
    }

    #[test]
    fn unknown_client_frame_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"subscribe"}"#).is_err());
    }

    #[test]
    fn notification_frame_carries_wire_event_name() {
        let notification = Notification::new(
            NotificationType::OrderReady,
            "Order for table 3 is ready",
            json!({}),
            Priority::High,
            Timestamp::now(),
        );
        let frame = ServerMessage::notification(Room::Waiters, notification);
        let value = serde_json::to_value(&frame).unwrap();

        assert_eq!(value["type"], "notification");
        assert_eq!(value["event"], "order-ready");
        assert_eq!(value["room"], "waiters");
        assert_eq!(value["notification"]["priority"], "high");
    }

    #[test]
    fn connected_frame_is_camel_case() {
        let frame = ServerMessage::Connected {
            connection_id: ConnectionId::new(),
            user_id: UserId::new("waiter-1").unwrap(),
            role: Role::Waiter,
            rooms: vec![Room::Global, Room::Waiters],
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "connected");
        assert_eq!(value["userId"], "waiter-1");
        assert_eq!(value["rooms"], json!(["global", "waiters"]));
    }
}
