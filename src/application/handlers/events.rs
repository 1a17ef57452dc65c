//! Collects the events of one committed write and publishes them.

use serde::Serialize;

use crate::domain::foundation::{AuthenticatedUser, DomainEvent, EventEnvelope};
use crate::ports::EventPublisher;

/// Events are published only after the store write committed, so a
/// publishing failure cannot undo anything. It is logged and swallowed.
pub(crate) struct EventBatch {
    user_id: String,
    envelopes: Vec<EventEnvelope>,
}

impl EventBatch {
    pub(crate) fn new(actor: &AuthenticatedUser) -> Self {
        Self {
            user_id: actor.id.to_string(),
            envelopes: Vec::new(),
        }
    }

    pub(crate) fn push<E>(&mut self, event: &E)
    where
        E: DomainEvent + Serialize,
    {
        match EventEnvelope::from_event(event) {
            Ok(envelope) => self
                .envelopes
                .push(envelope.with_user_id(self.user_id.clone())),
            Err(err) => tracing::error!(
                event_type = event.event_type(),
                error = %err,
                "Failed to serialize domain event"
            ),
        }
    }

    pub(crate) async fn publish(self, publisher: &dyn EventPublisher) {
        if self.envelopes.is_empty() {
            return;
        }
        let count = self.envelopes.len();
        if let Err(err) = publisher.publish_all(self.envelopes).await {
            tracing::warn!(count, error = %err, "Failed to publish committed events");
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.envelopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Role, TableId, UserId};
    use crate::domain::table::{TableChangeReason, TableStatus, TableStatusChanged};

    #[test]
    fn envelopes_carry_the_actor() {
        let actor = AuthenticatedUser::new(UserId::new("w-9").unwrap(), "Eva", Role::Waiter);
        let mut batch = EventBatch::new(&actor);
        batch.push(&TableStatusChanged::new(
            TableId::new(),
            4,
            TableStatus::Available,
            TableStatus::Occupied,
            TableChangeReason::OrderPlaced,
        ));

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.envelopes[0].metadata.user_id.as_deref(), Some("w-9"));
        assert_eq!(batch.envelopes[0].event_type, "table.status_changed.v1");
    }
}
