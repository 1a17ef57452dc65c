//! Menu error types.

use thiserror::Error;

use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{
    AuthError, CategoryId, DomainError, ErrorCode, ProductId, ValidationError,
};

#[derive(Debug, Clone, Error)]
pub enum MenuError {
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("'{0}' already exists")]
    DuplicateName(String),

    #[error("Daily close is active; {0} is locked")]
    Locked(LockCategory),

    #[error(transparent)]
    Forbidden(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl MenuError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MenuError::CategoryNotFound(_) => ErrorCode::CategoryNotFound,
            MenuError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            MenuError::DuplicateName(_) => ErrorCode::AlreadyExists,
            MenuError::Locked(_) => ErrorCode::DailyCloseLocked,
            MenuError::Forbidden(AuthError::InsufficientPermissions) => ErrorCode::Forbidden,
            MenuError::Forbidden(_) => ErrorCode::Unauthorized,
            MenuError::Validation(_) => ErrorCode::ValidationFailed,
            MenuError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for MenuError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::AlreadyExists => {
                MenuError::DuplicateName(err.details.get("name").cloned().unwrap_or_default())
            }
            _ => MenuError::Infrastructure(err.to_string()),
        }
    }
}
