//! Product recipes and the stock an order needs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{IngredientId, ProductId, ValidationError, STOCK};

use super::{Ingredient, InventoryError};

pub const MAX_RECIPE_LINES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub ingredient_id: IngredientId,
    /// Amount consumed per unit of product sold.
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub product_id: ProductId,
    pub lines: Vec<RecipeLine>,
}

impl Recipe {
    pub fn new(product_id: ProductId, lines: Vec<RecipeLine>) -> Result<Self, InventoryError> {
        if lines.len() > MAX_RECIPE_LINES {
            return Err(ValidationError::out_of_range(
                "ingredients",
                0,
                MAX_RECIPE_LINES as i64,
                lines.len() as i64,
            )
            .into());
        }
        for (index, line) in lines.iter().enumerate() {
            if line.quantity <= Decimal::ZERO {
                return Err(
                    ValidationError::invalid_format("quantity", "must be positive").into(),
                );
            }
            STOCK.check("quantity", line.quantity)?;
            if lines[..index]
                .iter()
                .any(|earlier| earlier.ingredient_id == line.ingredient_id)
            {
                return Err(ValidationError::invalid_format(
                    "ingredients",
                    format!("ingredient {} listed twice", line.ingredient_id),
                )
                .into());
            }
        }
        Ok(Self { product_id, lines })
    }
}

/// Total amount of one ingredient an order consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRequirement {
    pub ingredient_id: IngredientId,
    pub quantity: Decimal,
}

/// One ingredient that cannot cover its requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
    pub ingredient_id: IngredientId,
    pub ingredient_name: String,
    pub unit: String,
    pub required: Decimal,
    pub available: Decimal,
}

/// Sums recipe quantity times units ordered, per ingredient.
///
/// Products without a recipe consume nothing. Output is ordered by
/// ingredient id so stores lock rows in a stable order. Totals saturate;
/// anything past [`STOCK`] is a shortfall anyway.
pub fn requirements_for(
    quantities: &[(ProductId, i32)],
    recipes: &[Recipe],
) -> Vec<StockRequirement> {
    let mut totals: BTreeMap<IngredientId, Decimal> = BTreeMap::new();
    for (product_id, units) in quantities {
        let Some(recipe) = recipes.iter().find(|r| r.product_id == *product_id) else {
            continue;
        };
        for line in &recipe.lines {
            let needed = line.quantity.saturating_mul(Decimal::from(*units));
            let total = totals.entry(line.ingredient_id).or_insert(Decimal::ZERO);
            *total = total.saturating_add(needed);
        }
    }
    totals
        .into_iter()
        .map(|(ingredient_id, quantity)| StockRequirement {
            ingredient_id,
            quantity,
        })
        .collect()
}

/// All-or-nothing availability check. Every shortfall is reported, not
/// just the first; a missing ingredient counts as zero stock.
pub fn check_requirements(
    requirements: &[StockRequirement],
    stock: &[Ingredient],
) -> Result<(), Vec<Shortfall>> {
    let shortfalls: Vec<Shortfall> = requirements
        .iter()
        .filter_map(|req| {
            let ingredient = stock.iter().find(|i| *i.id() == req.ingredient_id);
            let available = ingredient.map(Ingredient::current_stock).unwrap_or(Decimal::ZERO);
            (available < req.quantity).then(|| Shortfall {
                ingredient_id: req.ingredient_id,
                ingredient_name: ingredient
                    .map(|i| i.name().to_string())
                    .unwrap_or_else(|| req.ingredient_id.to_string()),
                unit: ingredient.map(|i| i.unit().to_string()).unwrap_or_default(),
                required: req.quantity,
                available,
            })
        })
        .collect();

    if shortfalls.is_empty() {
        Ok(())
    } else {
        Err(shortfalls)
    }
}
