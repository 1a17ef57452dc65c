//! Inventory module - ingredients, stock movements, alerts and recipes.

mod alert;
mod errors;
mod events;
mod ingredient;
mod movement;
mod recipe;

pub use alert::{evaluate_alert, AlertType, StockAlert};
pub use errors::InventoryError;
pub use events::StockAlertRaised;
pub use ingredient::{Ingredient, StockChange};
pub use movement::{MovementType, StockMovement};
pub use recipe::{
    check_requirements, requirements_for, Recipe, RecipeLine, Shortfall, StockRequirement,
};
