//! DeleteTableHandler - removes a table with no active orders.

use std::sync::Arc;

use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthenticatedUser, TableId};
use crate::domain::table::TableError;
use crate::ports::{OrderRepository, TableRepository};

use super::{store_error, TABLE_ADMINS};

pub struct DeleteTableHandler {
    tables: Arc<dyn TableRepository>,
    orders: Arc<dyn OrderRepository>,
    lock: Arc<LockGuard>,
}

impl DeleteTableHandler {
    pub fn new(
        tables: Arc<dyn TableRepository>,
        orders: Arc<dyn OrderRepository>,
        lock: Arc<LockGuard>,
    ) -> Self {
        Self {
            tables,
            orders,
            lock,
        }
    }

    pub async fn handle(
        &self,
        table_id: TableId,
        actor: &AuthenticatedUser,
    ) -> Result<(), TableError> {
        actor.require_any(TABLE_ADMINS)?;
        self.lock.check(LockCategory::TableChange, actor).await?;

        let table = self
            .tables
            .find_by_id(&table_id)
            .await?
            .ok_or(TableError::NotFound(table_id))?;
        let active = self.orders.count_active_for_table(&table_id).await?;
        table.ensure_deletable(active)?;

        self.tables
            .delete(&table_id)
            .await
            .map_err(|err| store_error(table_id, err))?;
        tracing::info!(table = table.number(), user_id = %actor.id, "Table deleted");
        Ok(())
    }
}
