//! Order command and query handlers.
//!
//! Every command passes the daily-close gate before touching the store and
//! publishes its events only after the store write committed.

// Command handlers
mod change_status;
mod place_order;
mod record_payment;

// Query handlers
mod queries;

pub use change_status::{
    ChangeOrderStatusCommand, ChangeOrderStatusHandler, ChangeOrderStatusResult,
};
pub use place_order::{OrderItemRequest, PlaceOrderCommand, PlaceOrderHandler};
pub use queries::{GetOrderHandler, ListOrdersHandler, ListOrdersQuery};
pub use record_payment::{RecordPaymentCommand, RecordPaymentHandler};

use crate::domain::foundation::{DomainError, ErrorCode, OrderId};
use crate::domain::order::OrderError;

/// Store errors that name this order get their id back.
fn store_error(order_id: OrderId, err: DomainError) -> OrderError {
    match err.code {
        ErrorCode::OrderNotFound => OrderError::NotFound(order_id),
        ErrorCode::AlreadyPaid => OrderError::AlreadyPaid(order_id),
        _ => err.into(),
    }
}
