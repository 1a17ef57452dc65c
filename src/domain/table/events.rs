//! Table domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, TableId, Timestamp};

use super::{TableChangeReason, TableStatus};

/// Published whenever a table's status actually changes, whether a waiter
/// changed it or an order placement/close did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatusChanged {
    pub event_id: EventId,
    pub table_id: TableId,
    pub table_number: i32,
    pub from: TableStatus,
    pub to: TableStatus,
    pub reason: TableChangeReason,
    pub changed_at: Timestamp,
}

domain_event!(
    TableStatusChanged,
    event_type = "table.status_changed.v1",
    aggregate_id = table_id,
    aggregate_type = "Table",
    occurred_at = changed_at,
    event_id = event_id
);

impl TableStatusChanged {
    pub fn new(
        table_id: TableId,
        table_number: i32,
        from: TableStatus,
        to: TableStatus,
        reason: TableChangeReason,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            table_id,
            table_number,
            from,
            to,
            reason,
            changed_at: Timestamp::now(),
        }
    }
}
