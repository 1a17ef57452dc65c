//! Turns committed domain events into room notifications.
//!
//! ```text
//! handler commits → EventBatch → LocalEventBus
//!                                    │
//!                                    ▼
//!                           NotificationBridge
//!                     (payload → routing::* → deliveries)
//!                                    │
//!                                    ▼
//!                       NotificationBroadcaster → rooms
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::daily_close::{DayClosed, DayReopened};
use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::domain::inventory::StockAlertRaised;
use crate::domain::order::{OrderCreated, OrderStatusChanged};
use crate::domain::realtime::{routing, Delivery};
use crate::domain::table::TableStatusChanged;
use crate::ports::{EventHandler, EventSubscriber, NotificationBroadcaster};

/// Event types that produce notifications.
pub const REALTIME_EVENT_TYPES: &[&str] = &[
    "order.created.v1",
    "order.status_changed.v1",
    "table.status_changed.v1",
    "stock.alert_raised.v1",
    "daily_close.closed.v1",
    "daily_close.reopened.v1",
];

pub struct NotificationBridge {
    broadcaster: Arc<dyn NotificationBroadcaster>,
}

impl NotificationBridge {
    pub fn new_shared(broadcaster: Arc<dyn NotificationBroadcaster>) -> Arc<Self> {
        Arc::new(Self { broadcaster })
    }

    pub fn register(self: &Arc<Self>, subscriber: &dyn EventSubscriber) {
        subscriber.subscribe_all(REALTIME_EVENT_TYPES, self.clone());
    }

    fn deliveries(event: &EventEnvelope) -> Result<Vec<Delivery>, serde_json::Error> {
        Ok(match event.event_type.as_str() {
            "order.created.v1" => routing::new_order(&event.payload_as::<OrderCreated>()?),
            "order.status_changed.v1" => {
                routing::order_status_changed(&event.payload_as::<OrderStatusChanged>()?)
            }
            "table.status_changed.v1" => {
                routing::table_status_changed(&event.payload_as::<TableStatusChanged>()?)
            }
            "stock.alert_raised.v1" => {
                routing::stock_alert(&event.payload_as::<StockAlertRaised>()?)
            }
            "daily_close.closed.v1" => routing::day_closed(&event.payload_as::<DayClosed>()?),
            "daily_close.reopened.v1" => routing::day_reopened(&event.payload_as::<DayReopened>()?),
            _ => Vec::new(),
        })
    }
}

#[async_trait]
impl EventHandler for NotificationBridge {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let deliveries = match Self::deliveries(&event) {
            Ok(deliveries) => deliveries,
            Err(e) => {
                tracing::error!(
                    event_type = %event.event_type,
                    event_id = %event.event_id,
                    error = %e,
                    "Cannot read event payload; notification dropped"
                );
                return Ok(());
            }
        };
        if deliveries.is_empty() {
            return Ok(());
        }
        let reached = self.broadcaster.broadcast(deliveries).await;
        tracing::debug!(event_type = %event.event_type, reached, "Event fanned out");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NotificationBridge"
    }
}
