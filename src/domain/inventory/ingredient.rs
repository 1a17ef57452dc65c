//! Stocked ingredient and the arithmetic of stock movements.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{IngredientId, Timestamp, ValidationError, STOCK};

use super::{AlertType, InventoryError, MovementType};

pub const MAX_NAME_LENGTH: usize = 100;

/// Stock level before and after one movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub previous: Decimal,
    pub resulting: Decimal,
}

/// # Invariants
///
/// - `current_stock` and `min_stock` are never negative
/// - `name` is unique (enforced by the store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    id: IngredientId,
    name: String,
    unit: String,
    current_stock: Decimal,
    min_stock: Decimal,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Ingredient {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        current_stock: Decimal,
        min_stock: Decimal,
    ) -> Result<Self, InventoryError> {
        let name = name.into().trim().to_string();
        let unit = unit.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name").into());
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::out_of_range(
                "name",
                1,
                MAX_NAME_LENGTH as i64,
                name.chars().count() as i64,
            )
            .into());
        }
        if unit.is_empty() {
            return Err(ValidationError::empty_field("unit").into());
        }
        if current_stock < Decimal::ZERO {
            return Err(
                ValidationError::invalid_format("current_stock", "must not be negative").into(),
            );
        }
        if min_stock < Decimal::ZERO {
            return Err(ValidationError::invalid_format("min_stock", "must not be negative").into());
        }
        let current_stock = STOCK.check("current_stock", current_stock)?;
        let min_stock = STOCK.check("min_stock", min_stock)?;

        let now = Timestamp::now();
        Ok(Self {
            id: IngredientId::new(),
            name,
            unit,
            current_stock,
            min_stock,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn reconstitute(
        id: IngredientId,
        name: String,
        unit: String,
        current_stock: Decimal,
        min_stock: Decimal,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            unit,
            current_stock,
            min_stock,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &IngredientId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn current_stock(&self) -> Decimal {
        self.current_stock
    }

    pub fn min_stock(&self) -> Decimal {
        self.min_stock
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Stock level `kind` would produce, without touching `self`.
    ///
    /// ADJUSTMENT sets the level to `quantity` (a stock count); the others
    /// add or remove `quantity`. The resulting level must fit [`STOCK`].
    pub fn preview(
        &self,
        kind: MovementType,
        quantity: Decimal,
    ) -> Result<StockChange, InventoryError> {
        match kind {
            MovementType::Adjustment if quantity < Decimal::ZERO => {
                return Err(
                    ValidationError::invalid_format("quantity", "must not be negative").into(),
                );
            }
            MovementType::Adjustment => {}
            _ if quantity <= Decimal::ZERO => {
                return Err(ValidationError::invalid_format("quantity", "must be positive").into());
            }
            _ => {}
        }
        let quantity = STOCK.check("quantity", quantity)?;

        let previous = self.current_stock;
        let resulting = match kind {
            MovementType::In => previous.checked_add(quantity),
            MovementType::Out | MovementType::Waste => previous.checked_sub(quantity),
            MovementType::Adjustment => Some(quantity),
        };
        let Some(resulting) = resulting.filter(|level| *level <= STOCK.max) else {
            return Err(ValidationError::invalid_format(
                "quantity",
                format!("stock would exceed {}", STOCK.max),
            )
            .into());
        };
        if resulting < Decimal::ZERO {
            return Err(InventoryError::InsufficientStock {
                ingredient: self.name.clone(),
                requested: quantity,
                available: previous,
            });
        }
        Ok(StockChange {
            previous,
            resulting,
        })
    }

    /// Applies a movement; on error the ingredient is unchanged.
    pub fn apply_movement(
        &mut self,
        kind: MovementType,
        quantity: Decimal,
        at: Timestamp,
    ) -> Result<StockChange, InventoryError> {
        let change = self.preview(kind, quantity)?;
        self.current_stock = change.resulting;
        self.updated_at = at;
        Ok(change)
    }

    /// Alert level the current stock sits at, if any.
    pub fn alert_level(&self) -> Option<AlertType> {
        if self.current_stock <= Decimal::ZERO {
            Some(AlertType::OutOfStock)
        } else if self.current_stock <= self.min_stock {
            Some(AlertType::LowStock)
        } else {
            None
        }
    }
}
