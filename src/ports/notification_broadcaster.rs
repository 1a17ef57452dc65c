//! NotificationBroadcaster port - fire-and-forget delivery to rooms.

use async_trait::async_trait;

use crate::domain::realtime::Delivery;

/// Sends notifications to every connection currently in each room.
///
/// Delivery is best effort: connections that are gone or whose queue is
/// closed are skipped. Nothing is retried or stored for later.
#[async_trait]
pub trait NotificationBroadcaster: Send + Sync {
    /// Returns how many connection sends were attempted successfully.
    async fn broadcast(&self, deliveries: Vec<Delivery>) -> usize;
}
