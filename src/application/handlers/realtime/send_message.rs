use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::{
    AuthError, AuthenticatedUser, DomainError, ErrorCode, Role, TableId, ValidationError,
};
use crate::domain::realtime::{operator_text, routing};
use crate::ports::{NotificationBroadcaster, TableRepository};

#[derive(Debug, Clone, Error)]
pub enum MessageError {
    #[error("Table not found: {0}")]
    TableNotFound(TableId),

    #[error(transparent)]
    Forbidden(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl MessageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MessageError::TableNotFound(_) => ErrorCode::TableNotFound,
            MessageError::Forbidden(AuthError::InsufficientPermissions) => ErrorCode::Forbidden,
            MessageError::Forbidden(_) => ErrorCode::Unauthorized,
            MessageError::Validation(_) => ErrorCode::ValidationFailed,
            MessageError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for MessageError {
    fn from(err: DomainError) -> Self {
        MessageError::Infrastructure(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SendEmergencyCommand {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SendTableMessageCommand {
    pub table_id: TableId,
    pub message: String,
}

/// Critical alert to every connected client.
pub struct SendEmergencyHandler {
    broadcaster: Arc<dyn NotificationBroadcaster>,
}

impl SendEmergencyHandler {
    pub fn new(broadcaster: Arc<dyn NotificationBroadcaster>) -> Self {
        Self { broadcaster }
    }

    /// Returns how many connections were reached.
    pub async fn handle(
        &self,
        cmd: SendEmergencyCommand,
        actor: &AuthenticatedUser,
    ) -> Result<usize, MessageError> {
        actor.require_any(&Role::STAFF)?;
        let text = operator_text(&cmd.message)?;

        tracing::warn!(user_id = %actor.id, role = %actor.role, "Emergency raised");
        Ok(self
            .broadcaster
            .broadcast(routing::emergency(&text, &actor.name, actor.role))
            .await)
    }
}

pub struct SendTableMessageHandler {
    tables: Arc<dyn TableRepository>,
    broadcaster: Arc<dyn NotificationBroadcaster>,
}

impl SendTableMessageHandler {
    pub fn new(
        tables: Arc<dyn TableRepository>,
        broadcaster: Arc<dyn NotificationBroadcaster>,
    ) -> Self {
        Self {
            tables,
            broadcaster,
        }
    }

    pub async fn handle(
        &self,
        cmd: SendTableMessageCommand,
        actor: &AuthenticatedUser,
    ) -> Result<usize, MessageError> {
        actor.require_any(&Role::STAFF)?;
        let text = operator_text(&cmd.message)?;
        self.tables
            .find_by_id(&cmd.table_id)
            .await?
            .ok_or(MessageError::TableNotFound(cmd.table_id))?;

        let reached = self
            .broadcaster
            .broadcast(routing::table_message(cmd.table_id, &text, &actor.name))
            .await;
        tracing::debug!(table_id = %cmd.table_id, reached, "Table message sent");
        Ok(reached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{user, Fixture};
    use crate::domain::realtime::{Delivery, NotificationType, Priority, Room};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBroadcaster {
        sent: Mutex<Vec<Delivery>>,
    }

    #[async_trait]
    impl NotificationBroadcaster for RecordingBroadcaster {
        async fn broadcast(&self, deliveries: Vec<Delivery>) -> usize {
            let count = deliveries.len();
            self.sent.lock().unwrap().extend(deliveries);
            count
        }
    }

    #[tokio::test]
    async fn emergency_goes_to_global_room_as_critical() {
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let handler = SendEmergencyHandler::new(broadcaster.clone());

        handler
            .handle(
                SendEmergencyCommand {
                    message: "  Fire in the kitchen  ".to_string(),
                },
                &user(Role::Kitchen),
            )
            .await
            .unwrap();

        let sent = broadcaster.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].room, Room::Global);
        assert_eq!(sent[0].notification.kind, NotificationType::Emergency);
        assert_eq!(sent[0].notification.priority, Priority::Critical);
        assert_eq!(sent[0].notification.message, "Fire in the kitchen");
    }

    #[tokio::test]
    async fn customers_cannot_raise_emergencies() {
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let err = SendEmergencyHandler::new(broadcaster.clone())
            .handle(
                SendEmergencyCommand {
                    message: "help".to_string(),
                },
                &user(Role::Customer),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::Forbidden(_)));
        assert!(broadcaster.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_or_oversized_text_is_rejected() {
        let fx = Fixture::new();
        let table = fx.table(8).await;
        let handler = SendTableMessageHandler::new(
            fx.store.clone(),
            Arc::new(RecordingBroadcaster::default()),
        );

        for message in ["   ".to_string(), "x".repeat(501)] {
            let err = handler
                .handle(
                    SendTableMessageCommand {
                        table_id: *table.id(),
                        message,
                    },
                    &user(Role::Waiter),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, MessageError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn table_message_targets_table_room() {
        let fx = Fixture::new();
        let table = fx.table(8).await;
        let broadcaster = Arc::new(RecordingBroadcaster::default());

        SendTableMessageHandler::new(fx.store.clone(), broadcaster.clone())
            .handle(
                SendTableMessageCommand {
                    table_id: *table.id(),
                    message: "Your dessert is on its way".to_string(),
                },
                &user(Role::Waiter),
            )
            .await
            .unwrap();

        let sent = broadcaster.sent.lock().unwrap();
        assert_eq!(sent[0].room, Room::Table(*table.id()));
        assert_eq!(sent[0].notification.kind, NotificationType::TableMessage);
    }
}
