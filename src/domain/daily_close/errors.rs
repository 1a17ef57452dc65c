//! Daily-close error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::foundation::{AuthError, DailyCloseId, DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, Error)]
pub enum DailyCloseError {
    #[error("Daily close not found: {0}")]
    NotFound(DailyCloseId),

    #[error("Business day {0} is already closed")]
    AlreadyClosed(NaiveDate),

    #[error("Daily close {0} was already reopened")]
    AlreadyReopened(DailyCloseId),

    #[error("{0} order(s) are still active")]
    OrdersStillActive(i64),

    #[error(transparent)]
    Forbidden(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl DailyCloseError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DailyCloseError::NotFound(_) => ErrorCode::DailyCloseNotFound,
            DailyCloseError::AlreadyClosed(_) => ErrorCode::DayAlreadyClosed,
            DailyCloseError::AlreadyReopened(_) => ErrorCode::InvalidStateTransition,
            DailyCloseError::OrdersStillActive(_) => ErrorCode::InvalidStateTransition,
            DailyCloseError::Forbidden(AuthError::InsufficientPermissions) => ErrorCode::Forbidden,
            DailyCloseError::Forbidden(_) => ErrorCode::Unauthorized,
            DailyCloseError::Validation(_) => ErrorCode::ValidationFailed,
            DailyCloseError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for DailyCloseError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DayAlreadyClosed => match err
                .details
                .get("business_date")
                .and_then(|d| d.parse().ok())
            {
                Some(date) => DailyCloseError::AlreadyClosed(date),
                None => DailyCloseError::Infrastructure(err.to_string()),
            },
            _ => DailyCloseError::Infrastructure(err.to_string()),
        }
    }
}
