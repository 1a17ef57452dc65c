//! Order-specific error types.

use thiserror::Error;

use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{
    AuthError, DomainError, ErrorCode, OrderId, ProductId, TableId, ValidationError,
};
use crate::domain::inventory::Shortfall;
use crate::domain::table::TableStatus;

use super::OrderStatus;

#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    #[error("Table not found: {0}")]
    TableNotFound(TableId),

    #[error("Table {number} is {status} and cannot take orders")]
    TableUnavailable { number: i32, status: TableStatus },

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Product '{0}' is not available")]
    ProductUnavailable(String),

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Insufficient stock to fulfil the order")]
    InsufficientStock(Vec<Shortfall>),

    #[error("Order was modified concurrently; reload and retry")]
    ConcurrentModification,

    #[error("Order {0} is already paid")]
    AlreadyPaid(OrderId),

    #[error("Order in status {0} cannot be paid")]
    NotPayable(OrderStatus),

    #[error("Daily close is active; {0} is locked")]
    Locked(LockCategory),

    #[error(transparent)]
    Forbidden(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl OrderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::NotFound(_) => ErrorCode::OrderNotFound,
            OrderError::TableNotFound(_) => ErrorCode::TableNotFound,
            OrderError::TableUnavailable { .. } => ErrorCode::TableUnavailable,
            OrderError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            OrderError::ProductUnavailable(_) => ErrorCode::ProductUnavailable,
            OrderError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            OrderError::InsufficientStock(_) => ErrorCode::InsufficientStock,
            OrderError::ConcurrentModification => ErrorCode::ConcurrentModification,
            OrderError::AlreadyPaid(_) => ErrorCode::AlreadyPaid,
            OrderError::NotPayable(_) => ErrorCode::InvalidStateTransition,
            OrderError::Locked(_) => ErrorCode::DailyCloseLocked,
            OrderError::Forbidden(AuthError::InsufficientPermissions) => ErrorCode::Forbidden,
            OrderError::Forbidden(_) => ErrorCode::Unauthorized,
            OrderError::Validation(_) => ErrorCode::ValidationFailed,
            OrderError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for OrderError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ConcurrentModification => OrderError::ConcurrentModification,
            // Stock moved between validation and the write.
            ErrorCode::InsufficientStock => OrderError::InsufficientStock(Vec::new()),
            ErrorCode::TableUnavailable => {
                let number = err
                    .details
                    .get("table_number")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or_default();
                let status = err
                    .details
                    .get("status")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(TableStatus::OutOfService);
                OrderError::TableUnavailable { number, status }
            }
            ErrorCode::ValidationFailed => OrderError::Validation(ValidationError::invalid_format(
                err.details.get("field").cloned().unwrap_or_default(),
                err.message,
            )),
            _ => OrderError::Infrastructure(err.to_string()),
        }
    }
}
