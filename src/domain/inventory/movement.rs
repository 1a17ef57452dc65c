//! Stock movements: the audit trail behind every stock level change.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    IngredientId, OrderId, StockMovementId, Timestamp, UserId, ValidationError,
};

use super::StockChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    In,
    Out,
    /// Physical count; sets the level rather than moving it.
    Adjustment,
    Waste,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Adjustment => "ADJUSTMENT",
            MovementType::Waste => "WASTE",
        }
    }

    /// Restocking never raises alerts.
    pub fn can_raise_alert(&self) -> bool {
        !matches!(self, MovementType::In)
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(MovementType::In),
            "OUT" => Ok(MovementType::Out),
            "ADJUSTMENT" => Ok(MovementType::Adjustment),
            "WASTE" => Ok(MovementType::Waste),
            other => Err(ValidationError::invalid_format(
                "type",
                format!("unknown movement type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: StockMovementId,
    pub ingredient_id: IngredientId,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub resulting_stock: Decimal,
    pub reason: Option<String>,
    pub order_id: Option<OrderId>,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

impl StockMovement {
    pub fn record(
        ingredient_id: IngredientId,
        movement_type: MovementType,
        quantity: Decimal,
        change: StockChange,
        reason: Option<String>,
        created_by: UserId,
        at: Timestamp,
    ) -> Self {
        Self {
            id: StockMovementId::new(),
            ingredient_id,
            movement_type,
            quantity,
            previous_stock: change.previous,
            resulting_stock: change.resulting,
            reason: reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            order_id: None,
            created_by,
            created_at: at,
        }
    }

    /// OUT movement consuming stock for a confirmed order.
    pub fn for_order(
        ingredient_id: IngredientId,
        quantity: Decimal,
        change: StockChange,
        order_id: OrderId,
        created_by: UserId,
        at: Timestamp,
    ) -> Self {
        let mut movement = Self::record(
            ingredient_id,
            MovementType::Out,
            quantity,
            change,
            Some(format!("Order {}", order_id)),
            created_by,
            at,
        );
        movement.order_id = Some(order_id);
        movement
    }
}
