//! Inventory-specific error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{
    AuthError, DomainError, ErrorCode, IngredientId, ProductId, StockAlertId, ValidationError,
};

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("Ingredient not found: {0}")]
    IngredientNotFound(IngredientId),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Alert not found: {0}")]
    AlertNotFound(StockAlertId),

    #[error("Ingredient '{0}' already exists")]
    DuplicateName(String),

    #[error("Insufficient stock of {ingredient}: requested {requested}, available {available}")]
    InsufficientStock {
        ingredient: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Daily close is active; {0} is locked")]
    Locked(LockCategory),

    #[error(transparent)]
    Forbidden(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl InventoryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            InventoryError::IngredientNotFound(_) => ErrorCode::IngredientNotFound,
            InventoryError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            InventoryError::AlertNotFound(_) => ErrorCode::AlertNotFound,
            InventoryError::DuplicateName(_) => ErrorCode::AlreadyExists,
            InventoryError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            InventoryError::Locked(_) => ErrorCode::DailyCloseLocked,
            InventoryError::Forbidden(AuthError::InsufficientPermissions) => ErrorCode::Forbidden,
            InventoryError::Forbidden(_) => ErrorCode::Unauthorized,
            InventoryError::Validation(_) => ErrorCode::ValidationFailed,
            InventoryError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

/// Stores speak `DomainError`; movement rejections travel through it
/// with their numbers in `details`.
impl From<InventoryError> for DomainError {
    fn from(err: InventoryError) -> Self {
        let base = DomainError::new(err.code(), err.to_string());
        match err {
            InventoryError::InsufficientStock {
                ingredient,
                requested,
                available,
            } => base
                .with_detail("ingredient", ingredient)
                .with_detail("requested", requested.to_string())
                .with_detail("available", available.to_string()),
            InventoryError::DuplicateName(name) => base.with_detail("name", name),
            InventoryError::Validation(v) => base.with_detail("field", v.field().to_string()),
            _ => base,
        }
    }
}

impl From<DomainError> for InventoryError {
    fn from(err: DomainError) -> Self {
        let detail = |key: &str| err.details.get(key).cloned().unwrap_or_default();
        match err.code {
            ErrorCode::InsufficientStock => InventoryError::InsufficientStock {
                ingredient: detail("ingredient"),
                requested: detail("requested").parse().unwrap_or_default(),
                available: detail("available").parse().unwrap_or_default(),
            },
            ErrorCode::AlreadyExists => InventoryError::DuplicateName(detail("name")),
            ErrorCode::ValidationFailed => InventoryError::Validation(
                ValidationError::invalid_format(detail("field"), err.message.clone()),
            ),
            _ => InventoryError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_survives_a_round_trip_through_domain_error() {
        let original = InventoryError::InsufficientStock {
            ingredient: "Tomato".to_string(),
            requested: "6".parse().unwrap(),
            available: "5".parse().unwrap(),
        };
        let back: InventoryError = DomainError::from(original).into();
        match back {
            InventoryError::InsufficientStock {
                ingredient,
                requested,
                available,
            } => {
                assert_eq!(ingredient, "Tomato");
                assert_eq!(requested.to_string(), "6");
                assert_eq!(available.to_string(), "5");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
