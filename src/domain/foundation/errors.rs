//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    Locked,
    Internal,
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    OrderNotFound,
    TableNotFound,
    ProductNotFound,
    CategoryNotFound,
    IngredientNotFound,
    AlertNotFound,
    DailyCloseNotFound,

    // State errors
    InvalidStateTransition,
    ConcurrentModification,
    InsufficientStock,
    TableUnavailable,
    TableBusy,
    ProductUnavailable,
    AlreadyExists,
    AlreadyPaid,
    DayAlreadyClosed,
    DailyCloseLocked,

    // Authorization errors
    Unauthorized,
    Forbidden,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        use ErrorCode::*;
        match self {
            ValidationFailed => ErrorCategory::Validation,
            OrderNotFound | TableNotFound | ProductNotFound | CategoryNotFound
            | IngredientNotFound | AlertNotFound | DailyCloseNotFound => ErrorCategory::NotFound,
            InvalidStateTransition | ConcurrentModification | InsufficientStock
            | TableUnavailable | TableBusy | ProductUnavailable | AlreadyExists | AlreadyPaid
            | DayAlreadyClosed => ErrorCategory::Conflict,
            DailyCloseLocked => ErrorCategory::Locked,
            Unauthorized => ErrorCategory::Authentication,
            Forbidden => ErrorCategory::Authorization,
            DatabaseError | InternalError => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::OrderNotFound => "ORDER_NOT_FOUND",
            ErrorCode::TableNotFound => "TABLE_NOT_FOUND",
            ErrorCode::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorCode::CategoryNotFound => "CATEGORY_NOT_FOUND",
            ErrorCode::IngredientNotFound => "INGREDIENT_NOT_FOUND",
            ErrorCode::AlertNotFound => "ALERT_NOT_FOUND",
            ErrorCode::DailyCloseNotFound => "DAILY_CLOSE_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::TableUnavailable => "TABLE_UNAVAILABLE",
            ErrorCode::TableBusy => "TABLE_BUSY",
            ErrorCode::ProductUnavailable => "PRODUCT_UNAVAILABLE",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::AlreadyPaid => "ALREADY_PAID",
            ErrorCode::DayAlreadyClosed => "DAY_ALREADY_CLOSED",
            ErrorCode::DailyCloseLocked => "DAILY_CLOSE_LOCKED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Wraps a storage failure; the cause goes to the message, not the client.
    pub fn database(context: &str, err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::validation(field, err.to_string())
    }
}
