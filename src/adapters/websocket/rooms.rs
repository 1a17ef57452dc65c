//! Room membership and fan-out.
//!
//! ```text
//! Room: kitchen        Room: table:7f3c...
//! ├── conn-a           ├── conn-b
//! └── conn-c           └── conn-d
//! ```
//!
//! Each connection owns an unbounded send queue; a socket task drains it.
//! Sending never waits: a closed queue is skipped and the connection is
//! cleaned up when its socket task ends.

use std::collections::{HashMap, HashSet};

use tokio::sync::{mpsc, RwLock};

use crate::domain::foundation::ConnectionId;
use crate::domain::realtime::Room;

use super::messages::ServerMessage;

pub type ConnectionSender = mpsc::UnboundedSender<ServerMessage>;

struct Member {
    sender: ConnectionSender,
    rooms: HashSet<Room>,
}

#[derive(Default)]
struct Rooms {
    rooms: HashMap<Room, HashSet<ConnectionId>>,
    members: HashMap<ConnectionId, Member>,
}

impl Rooms {
    fn add(&mut self, connection_id: ConnectionId, room: Room) -> bool {
        let Some(member) = self.members.get_mut(&connection_id) else {
            return false;
        };
        if !member.rooms.insert(room) {
            return false;
        }
        self.rooms.entry(room).or_default().insert(connection_id);
        true
    }

    fn remove(&mut self, connection_id: &ConnectionId, room: &Room) -> bool {
        let Some(member) = self.members.get_mut(connection_id) else {
            return false;
        };
        if !member.rooms.remove(room) {
            return false;
        }
        if let Some(ids) = self.rooms.get_mut(room) {
            ids.remove(connection_id);
            if ids.is_empty() {
                self.rooms.remove(room);
            }
        }
        true
    }
}

/// Tracks room → connections and connection → (queue, rooms).
#[derive(Default)]
pub struct RoomManager {
    inner: RwLock<Rooms>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection and joins it to `rooms`.
    pub async fn connect(
        &self,
        connection_id: ConnectionId,
        sender: ConnectionSender,
        rooms: &[Room],
    ) {
        let mut inner = self.inner.write().await;
        inner.members.insert(
            connection_id,
            Member {
                sender,
                rooms: HashSet::new(),
            },
        );
        for room in rooms {
            inner.add(connection_id, *room);
        }
    }

    /// Removes the connection from every room it is in.
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        let mut inner = self.inner.write().await;
        let Some(member) = inner.members.get(connection_id) else {
            return;
        };
        let rooms: Vec<Room> = member.rooms.iter().copied().collect();
        for room in &rooms {
            inner.remove(connection_id, room);
        }
        inner.members.remove(connection_id);
    }

    /// Returns false if already a member or the connection is unknown.
    pub async fn join(&self, connection_id: ConnectionId, room: Room) -> bool {
        self.inner.write().await.add(connection_id, room)
    }

    pub async fn leave(&self, connection_id: &ConnectionId, room: &Room) -> bool {
        self.inner.write().await.remove(connection_id, room)
    }

    /// Queues `message` for every member of `room`. Returns how many queues
    /// accepted it.
    pub async fn send_to_room(&self, room: &Room, message: &ServerMessage) -> usize {
        let inner = self.inner.read().await;
        let Some(ids) = inner.rooms.get(room) else {
            return 0;
        };
        let mut delivered = 0;
        for id in ids {
            let Some(member) = inner.members.get(id) else {
                continue;
            };
            if member.sender.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(connection_id = %id, room = %room, "Send queue closed, skipping");
            }
        }
        delivered
    }

    /// Queues `message` for one connection.
    pub async fn send_to(&self, connection_id: &ConnectionId, message: ServerMessage) -> bool {
        self.inner
            .read()
            .await
            .members
            .get(connection_id)
            .map(|member| member.sender.send(message).is_ok())
            .unwrap_or(false)
    }

    pub async fn member_count(&self, room: &Room) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(room)
            .map(HashSet::len)
            .unwrap_or(0)
    }

    pub async fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<Room> {
        let inner = self.inner.read().await;
        let mut rooms: Vec<Room> = inner
            .members
            .get(connection_id)
            .map(|member| member.rooms.iter().copied().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    pub async fn active_rooms(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self.inner.read().await.rooms.keys().copied().collect();
        rooms.sort();
        rooms
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TableId;

    fn queue() -> (ConnectionSender, mpsc::UnboundedReceiver<ServerMessage>) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn room_send_reaches_only_its_members() {
        let manager = RoomManager::new();
        let (chef_tx, mut chef_rx) = queue();
        let (waiter_tx, mut waiter_rx) = queue();
        let chef = ConnectionId::new();
        let waiter = ConnectionId::new();
        manager.connect(chef, chef_tx, &[Room::Global, Room::Kitchen]).await;
        manager.connect(waiter, waiter_tx, &[Room::Global, Room::Waiters]).await;

        let sent = manager.send_to_room(&Room::Kitchen, &ServerMessage::pong()).await;

        assert_eq!(sent, 1);
        assert!(chef_rx.try_recv().is_ok());
        assert!(waiter_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn disconnect_drops_memberships_and_empty_rooms() {
        let manager = RoomManager::new();
        let (tx, _rx) = queue();
        let id = ConnectionId::new();
        let table = Room::Table(TableId::new());
        manager.connect(id, tx, &[Room::Global]).await;
        assert!(manager.join(id, table).await);
        assert!(!manager.join(id, table).await);

        manager.disconnect(&id).await;

        assert_eq!(manager.member_count(&table).await, 0);
        assert!(manager.active_rooms().await.is_empty());
        assert_eq!(manager.connection_count().await, 0);
    }

    #[tokio::test]
    async fn leaving_last_member_removes_room() {
        let manager = RoomManager::new();
        let (tx, _rx) = queue();
        let id = ConnectionId::new();
        let table = Room::Table(TableId::new());
        manager.connect(id, tx, &[Room::Global]).await;
        manager.join(id, table).await;

        assert!(manager.leave(&id, &table).await);
        assert!(!manager.leave(&id, &table).await);
        assert_eq!(manager.active_rooms().await, vec![Room::Global]);
    }

    #[tokio::test]
    async fn closed_queue_is_skipped() {
        let manager = RoomManager::new();
        let (gone_tx, gone_rx) = queue();
        let (live_tx, mut live_rx) = queue();
        drop(gone_rx);
        manager.connect(ConnectionId::new(), gone_tx, &[Room::Global]).await;
        manager.connect(ConnectionId::new(), live_tx, &[Room::Global]).await;

        let sent = manager.send_to_room(&Room::Global, &ServerMessage::pong()).await;

        assert_eq!(sent, 1);
        assert!(live_rx.try_recv().is_ok());
    }
}
