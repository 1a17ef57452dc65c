//! EventSubscriber port - Interface for subscribing to domain events.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// Handlers should be quick; an error is logged by the bus and does not
/// reach the publisher or other handlers.
///
/// # Example
///
/// ```ignore
/// #[async_trait]
/// impl EventHandler for NotificationBridge {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let created: OrderCreated = event.payload_as()?;
///         // build notifications, hand them to the broadcaster
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "NotificationBridge"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events by event type.
///
/// ```ignore
/// subscriber.subscribe_all(&["order.created.v1", "order.status_changed.v1"], bridge);
/// ```
pub trait EventSubscriber: Send + Sync {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

/// Publishing and subscribing in one object.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}
