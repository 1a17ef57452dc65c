//! Order domain events.
//!
//! - `OrderCreated` - order placed (and its table possibly occupied)
//! - `OrderStatusChanged` - lifecycle step committed
//! - `OrderPaid` - payment registered on a delivered order

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, OrderId, TableId, Timestamp, UserId};

use super::{Order, OrderStatus, PaymentMethod};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub product_name: String,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub event_id: EventId,
    pub order_id: OrderId,
    pub table_id: TableId,
    pub table_number: i32,
    pub items: Vec<OrderedItem>,
    pub total: Decimal,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

domain_event!(
    OrderCreated,
    event_type = "order.created.v1",
    aggregate_id = order_id,
    aggregate_type = "Order",
    occurred_at = created_at,
    event_id = event_id
);

impl OrderCreated {
    pub fn from_order(order: &Order) -> Self {
        Self {
            event_id: EventId::new(),
            order_id: *order.id(),
            table_id: *order.table_id(),
            table_number: order.table_number(),
            items: order
                .items()
                .iter()
                .map(|item| OrderedItem {
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    notes: item.notes.clone(),
                })
                .collect(),
            total: order.total(),
            notes: order.notes().map(str::to_string),
            created_by: order.created_by().clone(),
            created_at: *order.created_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub event_id: EventId,
    pub order_id: OrderId,
    pub table_id: TableId,
    pub table_number: i32,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_by: UserId,
    /// The table went back to AVAILABLE in the same commit.
    pub table_released: bool,
    pub changed_at: Timestamp,
}

domain_event!(
    OrderStatusChanged,
    event_type = "order.status_changed.v1",
    aggregate_id = order_id,
    aggregate_type = "Order",
    occurred_at = changed_at,
    event_id = event_id
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaid {
    pub event_id: EventId,
    pub order_id: OrderId,
    pub table_number: i32,
    pub method: PaymentMethod,
    pub amount: Decimal,
    pub paid_at: Timestamp,
}

domain_event!(
    OrderPaid,
    event_type = "order.paid.v1",
    aggregate_id = order_id,
    aggregate_type = "Order",
    occurred_at = paid_at,
    event_id = event_id
);
