//! SetTableStatusHandler - staff-initiated table status changes.

use std::sync::Arc;

use crate::application::handlers::events::EventBatch;
use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthenticatedUser, Role, TableId};
use crate::domain::table::{Table, TableChangeReason, TableError, TableStatus, TableStatusChanged};
use crate::ports::{EventPublisher, OrderRepository, TableRepository};

use super::store_error;

const FLOOR_STAFF: &[Role] = &[Role::Admin, Role::Manager, Role::Waiter];

#[derive(Debug, Clone)]
pub struct SetTableStatusCommand {
    pub table_id: TableId,
    pub status: TableStatus,
}

pub struct SetTableStatusHandler {
    tables: Arc<dyn TableRepository>,
    orders: Arc<dyn OrderRepository>,
    lock: Arc<LockGuard>,
    publisher: Arc<dyn EventPublisher>,
}

impl SetTableStatusHandler {
    pub fn new(
        tables: Arc<dyn TableRepository>,
        orders: Arc<dyn OrderRepository>,
        lock: Arc<LockGuard>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            tables,
            orders,
            lock,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: SetTableStatusCommand,
        actor: &AuthenticatedUser,
    ) -> Result<Table, TableError> {
        actor.require_any(FLOOR_STAFF)?;
        self.lock.check(LockCategory::TableChange, actor).await?;

        let mut table = self
            .tables
            .find_by_id(&cmd.table_id)
            .await?
            .ok_or(TableError::NotFound(cmd.table_id))?;
        let active = self.orders.count_active_for_table(&cmd.table_id).await?;
        let previous = table.change_status(cmd.status, active)?;

        // The store repeats the idle check inside its own write.
        let require_idle = matches!(cmd.status, TableStatus::Available | TableStatus::OutOfService);
        self.tables
            .set_status(&cmd.table_id, cmd.status, require_idle)
            .await
            .map_err(|err| store_error(cmd.table_id, err))?;

        if previous != cmd.status {
            tracing::info!(
                table = table.number(),
                from = %previous,
                to = %cmd.status,
                user_id = %actor.id,
                "Table status changed"
            );
            let mut batch = EventBatch::new(actor);
            batch.push(&TableStatusChanged::new(
                cmd.table_id,
                table.number(),
                previous,
                cmd.status,
                TableChangeReason::Manual,
            ));
            batch.publish(self.publisher.as_ref()).await;
        }
        Ok(table)
    }
}
