//! Low-stock and out-of-stock alerts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{IngredientId, StockAlertId, Timestamp, ValidationError};

use super::{Ingredient, MovementType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    LowStock,
    OutOfStock,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowStock => "LOW_STOCK",
            AlertType::OutOfStock => "OUT_OF_STOCK",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW_STOCK" => Ok(AlertType::LowStock),
            "OUT_OF_STOCK" => Ok(AlertType::OutOfStock),
            other => Err(ValidationError::invalid_format(
                "alert_type",
                format!("unknown alert type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub id: StockAlertId,
    pub ingredient_id: IngredientId,
    pub ingredient_name: String,
    pub alert_type: AlertType,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub created_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

impl StockAlert {
    pub fn raise(ingredient: &Ingredient, alert_type: AlertType, at: Timestamp) -> Self {
        Self {
            id: StockAlertId::new(),
            ingredient_id: *ingredient.id(),
            ingredient_name: ingredient.name().to_string(),
            alert_type,
            current_stock: ingredient.current_stock(),
            min_stock: ingredient.min_stock(),
            created_at: at,
            resolved_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.resolved_at.is_none()
    }

    pub fn resolve(&mut self, at: Timestamp) {
        if self.resolved_at.is_none() {
            self.resolved_at = Some(at);
        }
    }
}

/// Decides whether a movement that just left `ingredient` at its new level
/// should raise an alert. `open` lists alert types still unresolved for it.
pub fn evaluate_alert(
    movement_type: MovementType,
    ingredient: &Ingredient,
    open: &[AlertType],
) -> Option<AlertType> {
    if !movement_type.can_raise_alert() {
        return None;
    }
    ingredient
        .alert_level()
        .filter(|level| !open.contains(level))
}
