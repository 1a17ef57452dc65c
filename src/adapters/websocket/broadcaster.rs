//! Room-backed `NotificationBroadcaster`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::realtime::Delivery;
use crate::ports::NotificationBroadcaster;

use super::messages::ServerMessage;
use super::rooms::RoomManager;

pub struct RoomBroadcaster {
    rooms: Arc<RoomManager>,
}

impl RoomBroadcaster {
    pub fn new(rooms: Arc<RoomManager>) -> Self {
        Self { rooms }
    }
}

#[async_trait]
impl NotificationBroadcaster for RoomBroadcaster {
    async fn broadcast(&self, deliveries: Vec<Delivery>) -> usize {
        let mut reached = 0;
        for delivery in deliveries {
            let room = delivery.room;
            let priority = delivery.notification.priority;
            let frame = ServerMessage::notification(room, delivery.notification);
            let sent = self.rooms.send_to_room(&room, &frame).await;
            tracing::debug!(room = %room, ?priority, sent, "Notification delivered");
            reached += sent;
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ConnectionId, Role, TableId};
    use crate::domain::realtime::{routing, Room};
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn emergency_reaches_every_connection() {
        let rooms = Arc::new(RoomManager::new());
        let mut receivers = Vec::new();
        for joined in [&[Room::Global, Room::Kitchen][..], &[Room::Global][..]] {
            let (tx, rx) = mpsc::unbounded_channel();
            rooms.connect(ConnectionId::new(), tx, joined).await;
            receivers.push(rx);
        }

        let reached = RoomBroadcaster::new(rooms.clone())
            .broadcast(routing::emergency("Gas leak", "Ana", Role::Manager))
            .await;

        assert_eq!(reached, 2);
        for rx in &mut receivers {
            match rx.try_recv().unwrap() {
                ServerMessage::Notification { event, room, .. } => {
                    assert_eq!(event, "emergency");
                    assert_eq!(room, Room::Global);
                }
                other => panic!("unexpected frame {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn empty_room_reaches_nobody() {
        let rooms = Arc::new(RoomManager::new());
        let reached = RoomBroadcaster::new(rooms)
            .broadcast(routing::table_message(TableId::new(), "hello", "Luis"))
            .await;
        assert_eq!(reached, 0);
    }
}
