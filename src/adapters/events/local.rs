//! In-process event bus.
//!
//! Delivers each envelope to the handlers subscribed to its event type, in
//! subscription order, before `publish` returns. The real-time bridge is the
//! main subscriber in a running server.
//!
//! A bus built with [`LocalEventBus::recording`] also keeps every envelope it
//! saw so tests can assert on them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

#[derive(Default)]
pub struct LocalEventBus {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
    published: Option<RwLock<Vec<EventEnvelope>>>,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus that keeps a copy of every published envelope.
    pub fn recording() -> Self {
        Self {
            handlers: RwLock::default(),
            published: Some(RwLock::default()),
        }
    }

    /// Envelopes published so far; empty unless built with `recording`.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .as_ref()
            .map(|p| p.read().unwrap_or_else(PoisonError::into_inner).clone())
            .unwrap_or_default()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.published_events()
            .iter()
            .any(|e| e.event_type == event_type)
    }

    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl EventPublisher for LocalEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if let Some(published) = &self.published {
            published
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        }

        // Clone the handler list so no lock is held across an await.
        let type_handlers: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event.event_type)
            .cloned()
            .unwrap_or_default();

        let mut errors = Vec::new();
        for handler in type_handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                tracing::warn!(
                    handler = handler.name(),
                    event_type = %event.event_type,
                    error = %e,
                    "Event handler failed"
                );
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Handler errors: {}", errors.join(", ")),
            ));
        }
        Ok(())
    }

    /// Publishes every envelope even if an earlier one had a failing handler.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        let mut first_error = None;
        for event in events {
            if let Err(e) = self.publish(event).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl EventSubscriber for LocalEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        for event_type in event_types {
            handlers
                .entry(event_type.to_string())
                .or_default()
                .push(Arc::clone(&handler));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, EventMetadata, Timestamp};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope {
            event_id: EventId::new(),
            event_type: event_type.to_string(),
            aggregate_id: "agg-1".to_string(),
            aggregate_type: "Order".to_string(),
            occurred_at: Timestamp::now(),
            payload: json!({}),
            metadata: EventMetadata::default(),
        }
    }

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _event: EventEnvelope) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl EventHandler for FailingHandler {
        async fn handle(&self, _event: EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "boom"))
        }

        fn name(&self) -> &'static str {
            "FailingHandler"
        }
    }

    #[tokio::test]
    async fn delivers_only_to_matching_subscribers() {
        let bus = LocalEventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe("order.created.v1", Arc::new(CountingHandler(count.clone())));

        bus.publish(envelope("order.created.v1")).await.unwrap();
        bus.publish(envelope("order.paid.v1")).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn subscribe_all_registers_one_handler_for_many_types() {
        let bus = LocalEventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe_all(
            &["order.created.v1", "order.paid.v1"],
            Arc::new(CountingHandler(count.clone())),
        );

        bus.publish_all(vec![envelope("order.created.v1"), envelope("order.paid.v1")])
            .await
            .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(bus.handler_count("order.paid.v1"), 1);
    }

    #[tokio::test]
    async fn failing_handler_does_not_starve_the_rest() {
        let bus = LocalEventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe("order.created.v1", Arc::new(FailingHandler));
        bus.subscribe("order.created.v1", Arc::new(CountingHandler(count.clone())));

        let result = bus
            .publish_all(vec![envelope("order.created.v1"), envelope("order.created.v1")])
            .await;

        assert!(result.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn only_recording_bus_keeps_history() {
        let plain = LocalEventBus::new();
        plain.publish(envelope("order.created.v1")).await.unwrap();
        assert!(plain.published_events().is_empty());

        let recording = LocalEventBus::recording();
        recording.publish(envelope("order.created.v1")).await.unwrap();
        assert!(recording.has_event("order.created.v1"));
        assert_eq!(recording.events_of_type("order.paid.v1").len(), 0);
    }
}
