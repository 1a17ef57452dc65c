//! Table queries.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, Role, TableId};
use crate::domain::table::{Table, TableError};
use crate::ports::TableRepository;

pub struct GetTableHandler {
    tables: Arc<dyn TableRepository>,
}

impl GetTableHandler {
    pub fn new(tables: Arc<dyn TableRepository>) -> Self {
        Self { tables }
    }

    pub async fn handle(
        &self,
        id: TableId,
        actor: &AuthenticatedUser,
    ) -> Result<Table, TableError> {
        actor.require_any(&Role::STAFF)?;
        self.tables
            .find_by_id(&id)
            .await?
            .ok_or(TableError::NotFound(id))
    }
}

pub struct ListTablesHandler {
    tables: Arc<dyn TableRepository>,
}

impl ListTablesHandler {
    pub fn new(tables: Arc<dyn TableRepository>) -> Self {
        Self { tables }
    }

    pub async fn handle(&self, actor: &AuthenticatedUser) -> Result<Vec<Table>, TableError> {
        actor.require_any(&Role::STAFF)?;
        Ok(self.tables.list().await?)
    }
}
