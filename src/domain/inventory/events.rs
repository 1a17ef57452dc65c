//! Inventory domain events.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, IngredientId, StockAlertId, Timestamp};

use super::{AlertType, StockAlert};

/// Published for every alert a movement (manual or order-driven) raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlertRaised {
    pub event_id: EventId,
    pub alert_id: StockAlertId,
    pub ingredient_id: IngredientId,
    pub ingredient_name: String,
    pub alert_type: AlertType,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub raised_at: Timestamp,
}

domain_event!(
    StockAlertRaised,
    event_type = "stock.alert_raised.v1",
    aggregate_id = ingredient_id,
    aggregate_type = "Ingredient",
    occurred_at = raised_at,
    event_id = event_id
);

impl From<&StockAlert> for StockAlertRaised {
    fn from(alert: &StockAlert) -> Self {
        Self {
            event_id: EventId::new(),
            alert_id: alert.id,
            ingredient_id: alert.ingredient_id,
            ingredient_name: alert.ingredient_name.clone(),
            alert_type: alert.alert_type,
            current_stock: alert.current_stock,
            min_stock: alert.min_stock,
            raised_at: alert.created_at,
        }
    }
}
