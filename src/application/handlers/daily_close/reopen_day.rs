use std::sync::Arc;

use crate::application::handlers::events::EventBatch;
use crate::domain::daily_close::{DailyClose, DailyCloseError, DayReopened};
use crate::domain::foundation::{
    AuthenticatedUser, DailyCloseId, ErrorCode, EventId, Role, Timestamp,
};
use crate::ports::{DailyCloseRepository, EventPublisher};

/// Reopens a closed day. Admin only and never gated by the lock it lifts.
pub struct ReopenDayHandler {
    closes: Arc<dyn DailyCloseRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl ReopenDayHandler {
    pub fn new(closes: Arc<dyn DailyCloseRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { closes, publisher }
    }

    pub async fn handle(
        &self,
        close_id: DailyCloseId,
        actor: &AuthenticatedUser,
    ) -> Result<DailyClose, DailyCloseError> {
        actor.require_any(&[Role::Admin])?;

        let mut close = self
            .closes
            .find_by_id(&close_id)
            .await?
            .ok_or(DailyCloseError::NotFound(close_id))?;
        let now = Timestamp::now();
        close.reopen(actor.id.clone(), now)?;
        self.closes
            .mark_reopened(&close)
            .await
            .map_err(|err| match err.code {
                ErrorCode::ConcurrentModification => DailyCloseError::AlreadyReopened(close_id),
                _ => err.into(),
            })?;

        tracing::info!(
            business_date = %close.business_date(),
            user_id = %actor.id,
            "Business day reopened"
        );

        let mut batch = EventBatch::new(actor);
        batch.push(&DayReopened {
            event_id: EventId::new(),
            close_id,
            business_date: close.business_date(),
            reopened_by: actor.id.clone(),
            reopened_at: now,
        });
        batch.publish(self.publisher.as_ref()).await;
        Ok(close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{user, Fixture};

    #[tokio::test]
    async fn reopen_lifts_the_lock_once() {
        let fx = Fixture::new();
        let close = fx.close_today().await;
        let handler = ReopenDayHandler::new(fx.store.clone(), fx.bus.clone());

        let reopened = handler.handle(*close.id(), &user(Role::Admin)).await.unwrap();
        assert!(!reopened.is_active());
        assert!(!fx.lock.is_today_closed().await.unwrap());
        assert!(fx.bus.has_event("daily_close.reopened.v1"));

        let err = handler.handle(*close.id(), &user(Role::Admin)).await.unwrap_err();
        assert!(matches!(err, DailyCloseError::AlreadyReopened(_)));
    }

    #[tokio::test]
    async fn managers_cannot_reopen() {
        let fx = Fixture::new();
        let close = fx.close_today().await;
        let err = ReopenDayHandler::new(fx.store.clone(), fx.bus.clone())
            .handle(*close.id(), &user(Role::Manager))
            .await
            .unwrap_err();
        assert!(matches!(err, DailyCloseError::Forbidden(_)));
    }

    #[tokio::test]
    async fn unknown_close_is_not_found() {
        let fx = Fixture::new();
        let err = ReopenDayHandler::new(fx.store.clone(), fx.bus.clone())
            .handle(DailyCloseId::new(), &user(Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, DailyCloseError::NotFound(_)));
    }
}
