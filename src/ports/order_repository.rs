//! Order repository port.
//!
//! Order writes are where the lifecycle side effects live, so the two
//! mutating operations here are each one storage transaction:
//!
//! - [`OrderRepository::create`] inserts the order and flips its table to
//!   OCCUPIED when needed.
//! - [`OrderRepository::apply_status_change`] moves the status, deducts
//!   stock, records movements and alerts, and releases the table.
//!
//! If any step fails nothing is written.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, TableId, Timestamp, UserId};
use crate::domain::inventory::{StockAlert, StockMovement, StockRequirement};
use crate::domain::order::{Order, OrderStatus, Payment};
use crate::domain::table::TableStatus;

use super::{Page, PageRequest};

/// Filters for order listings. All fields are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub table_id: Option<TableId>,
    /// Only orders still in an active status.
    pub active_only: bool,
}

/// A validated status change, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub order_id: OrderId,
    pub table_id: TableId,
    /// Status the order had when it was validated. The write only applies
    /// while the stored status still matches.
    pub expected: OrderStatus,
    pub target: OrderStatus,
    /// Per-ingredient stock to deduct; empty unless the target deducts stock.
    pub deductions: Vec<StockRequirement>,
    pub changed_by: UserId,
    pub changed_at: Timestamp,
}

impl StatusChange {
    /// Delivering or cancelling may free the table.
    pub fn may_release_table(&self) -> bool {
        !self.target.is_active()
    }
}

/// What the status change did besides moving the status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusChangeOutcome {
    /// Table status before it was set AVAILABLE, if it was released.
    pub released_from: Option<TableStatus>,
    pub movements: Vec<StockMovement>,
    pub alerts: Vec<StockAlert>,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order. In the same transaction the table row is locked,
    /// re-checked (not OUT_OF_SERVICE), and set OCCUPIED when it was
    /// AVAILABLE or RESERVED.
    ///
    /// Returns the table's previous status if it changed.
    ///
    /// # Errors
    ///
    /// - `TableNotFound` if the table disappeared
    /// - `TableUnavailable` if the table went out of service meanwhile
    /// - `DatabaseError` on persistence failure
    async fn create(&self, order: &Order) -> Result<Option<TableStatus>, DomainError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Newest first.
    async fn list(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError>;

    /// Orders created in `[from, to)`, oldest first.
    async fn list_created_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Order>, DomainError>;

    /// Orders in any active status, across all tables.
    async fn count_active(&self) -> Result<i64, DomainError>;

    async fn count_active_for_table(&self, table_id: &TableId) -> Result<i64, DomainError>;

    /// Applies a status change atomically.
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if the stored status is no longer `expected`
    /// - `InsufficientStock` if a conditional decrement finds too little stock
    /// - `DatabaseError` on persistence failure
    async fn apply_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<StatusChangeOutcome, DomainError>;

    /// Stores a payment on a delivered, unpaid order.
    ///
    /// # Errors
    ///
    /// - `AlreadyPaid` if a payment landed first
    /// - `ConcurrentModification` if the order is no longer DELIVERED
    async fn record_payment(&self, id: &OrderId, payment: &Payment) -> Result<(), DomainError>;
}
