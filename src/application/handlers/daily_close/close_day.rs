//! CloseDayHandler - totals today's orders and locks further mutations.

use std::sync::Arc;

use crate::application::handlers::events::EventBatch;
use crate::application::LockGuard;
use crate::domain::daily_close::{DailyClose, DailyCloseError, DayClosed, DayTotals};
use crate::domain::foundation::{AuthenticatedUser, EventId, Role};
use crate::ports::{DailyCloseRepository, EventPublisher, OrderRepository};

#[derive(Debug, Clone, Default)]
pub struct CloseDayCommand {
    pub notes: Option<String>,
}

pub struct CloseDayHandler {
    closes: Arc<dyn DailyCloseRepository>,
    orders: Arc<dyn OrderRepository>,
    lock: Arc<LockGuard>,
    publisher: Arc<dyn EventPublisher>,
}

impl CloseDayHandler {
    pub fn new(
        closes: Arc<dyn DailyCloseRepository>,
        orders: Arc<dyn OrderRepository>,
        lock: Arc<LockGuard>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            closes,
            orders,
            lock,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CloseDayCommand,
        actor: &AuthenticatedUser,
    ) -> Result<DailyClose, DailyCloseError> {
        actor.require_any(&[Role::Admin, Role::Manager])?;

        let calendar = self.lock.calendar();
        let today = calendar.today();
        if self.closes.find_active_for(today).await?.is_some() {
            return Err(DailyCloseError::AlreadyClosed(today));
        }

        let active = self.orders.count_active().await?;
        let (from, to) = calendar.bounds(today);
        let orders = self.orders.list_created_between(from, to).await?;
        let totals = DayTotals::from_orders(&orders);

        let close = DailyClose::close(today, actor.id.clone(), totals, active, cmd.notes)?;
        // A concurrent close of the same date loses here.
        self.closes.save(&close).await?;

        tracing::info!(
            business_date = %today,
            orders = close.totals().order_count,
            revenue = %close.totals().revenue,
            user_id = %actor.id,
            "Business day closed"
        );

        let mut batch = EventBatch::new(actor);
        batch.push(&DayClosed {
            event_id: EventId::new(),
            close_id: *close.id(),
            business_date: today,
            closed_by: actor.id.clone(),
            totals: close.totals().clone(),
            closed_at: *close.closed_at(),
        });
        batch.publish(self.publisher.as_ref()).await;
        Ok(close)
    }
}
