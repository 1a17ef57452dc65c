//! EventPublisher port - Interface for publishing domain events.
//!
//! Handlers publish after their store write commits; subscribers (the
//! real-time bridge, tests) never see events for rolled-back writes.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// # Example
///
/// ```ignore
/// let envelope = EventEnvelope::from_event(&OrderCreated::from_order(&order))?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publishes in order. Adapters without batch support publish one by
    /// one and stop at the first error.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}
