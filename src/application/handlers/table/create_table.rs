//! CreateTableHandler - adds a table and generates its QR payload.

use std::sync::Arc;

use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::AuthenticatedUser;
use crate::domain::table::{Table, TableError};
use crate::ports::TableRepository;

use super::TABLE_ADMINS;

#[derive(Debug, Clone)]
pub struct CreateTableCommand {
    pub number: i32,
    pub capacity: i32,
}

pub struct CreateTableHandler {
    tables: Arc<dyn TableRepository>,
    lock: Arc<LockGuard>,
    public_base_url: String,
}

impl CreateTableHandler {
    pub fn new(
        tables: Arc<dyn TableRepository>,
        lock: Arc<LockGuard>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            tables,
            lock,
            public_base_url: public_base_url.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateTableCommand,
        actor: &AuthenticatedUser,
    ) -> Result<Table, TableError> {
        actor.require_any(TABLE_ADMINS)?;
        self.lock.check(LockCategory::TableChange, actor).await?;

        let table = Table::new(cmd.number, cmd.capacity, &self.public_base_url)?;
        self.tables.save(&table).await?;

        tracing::info!(table_id = %table.id(), number = table.number(), "Table created");
        Ok(table)
    }
}
