//! Table-specific error types.

use thiserror::Error;

use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthError, DomainError, ErrorCode, TableId, ValidationError};

use super::TableStatus;

#[derive(Debug, Clone, Error)]
pub enum TableError {
    #[error("Table not found: {0}")]
    NotFound(TableId),

    #[error("Table number {0} is already in use")]
    DuplicateNumber(i32),

    #[error("Table {number} is {status}")]
    Unavailable { number: i32, status: TableStatus },

    #[error("Table {number} still has {active_orders} active order(s)")]
    Busy { number: i32, active_orders: i64 },

    #[error("Daily close is active; {0} is locked")]
    Locked(LockCategory),

    #[error(transparent)]
    Forbidden(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl TableError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TableError::NotFound(_) => ErrorCode::TableNotFound,
            TableError::DuplicateNumber(_) => ErrorCode::AlreadyExists,
            TableError::Unavailable { .. } => ErrorCode::TableUnavailable,
            TableError::Busy { .. } => ErrorCode::TableBusy,
            TableError::Locked(_) => ErrorCode::DailyCloseLocked,
            TableError::Forbidden(AuthError::InsufficientPermissions) => ErrorCode::Forbidden,
            TableError::Forbidden(_) => ErrorCode::Unauthorized,
            TableError::Validation(_) => ErrorCode::ValidationFailed,
            TableError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for TableError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::AlreadyExists => TableError::DuplicateNumber(
                err.details
                    .get("number")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or_default(),
            ),
            ErrorCode::TableBusy => TableError::Busy {
                number: err
                    .details
                    .get("number")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or_default(),
                active_orders: err
                    .details
                    .get("active_orders")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(1),
            },
            _ => TableError::Infrastructure(err.to_string()),
        }
    }
}
