//! Inventory handlers.
//!
//! Stock can still be corrected by an admin after the day is closed; every
//! other caller is held by the daily-close gate.

mod create_ingredient;
mod queries;
mod record_movement;
mod resolve_alert;

pub use create_ingredient::{CreateIngredientCommand, CreateIngredientHandler};
pub use queries::{
    GetIngredientHandler, ListAlertsHandler, ListIngredientsHandler, ListMovementsHandler,
};
pub use record_movement::{RecordMovementCommand, RecordMovementHandler};
pub use resolve_alert::ResolveAlertHandler;

use crate::domain::foundation::Role;

const STOCK_KEEPERS: &[Role] = &[Role::Admin, Role::Manager, Role::Kitchen];
