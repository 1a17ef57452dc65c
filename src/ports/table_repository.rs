//! Table repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TableId};
use crate::domain::table::{Table, TableStatus};

#[async_trait]
pub trait TableRepository: Send + Sync {
    /// # Errors
    ///
    /// - `AlreadyExists` (detail `number`) when the number is taken
    async fn save(&self, table: &Table) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &TableId) -> Result<Option<Table>, DomainError>;

    /// Ordered by table number.
    async fn list(&self) -> Result<Vec<Table>, DomainError>;

    /// Sets the status only while the table has no active orders when
    /// `require_idle` is set; the check and the write share a transaction.
    ///
    /// # Errors
    ///
    /// - `TableNotFound`
    /// - `TableBusy` (details `number`, `active_orders`)
    async fn set_status(
        &self,
        id: &TableId,
        status: TableStatus,
        require_idle: bool,
    ) -> Result<(), DomainError>;

    /// Deletes a table with no active orders.
    ///
    /// # Errors
    ///
    /// - `TableNotFound`
    /// - `TableBusy` if an order arrived since the caller checked
    async fn delete(&self, id: &TableId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn TableRepository) {}
    }
}
