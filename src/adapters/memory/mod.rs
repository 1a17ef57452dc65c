//! In-memory storage adapter.
//!
//! One `MemoryStore` implements every repository port over a single
//! `tokio::sync::Mutex`. Holding that lock for a whole operation gives the
//! same all-or-nothing behavior the PostgreSQL adapter gets from a
//! transaction: every write is staged on clones and only committed once the
//! last check has passed.
//!
//! Used by unit and integration tests, and by `database.backend = memory`
//! for demos. Nothing survives a restart.

mod catalog;
mod closes;
mod inventory;
mod orders;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::daily_close::DailyClose;
use crate::domain::foundation::{
    CategoryId, IngredientId, OrderId, ProductId, TableId, UserId,
};
use crate::domain::inventory::{
    evaluate_alert, AlertType, Ingredient, MovementType, Recipe, StockAlert, StockMovement,
};
use crate::domain::menu::{Category, Product};
use crate::domain::order::Order;
use crate::domain::staff::StaffAccount;
use crate::domain::table::Table;

#[derive(Debug, Default)]
pub(crate) struct State {
    tables: HashMap<TableId, Table>,
    /// Insertion order doubles as creation order.
    orders: Vec<Order>,
    order_index: HashMap<OrderId, usize>,
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    recipes: HashMap<ProductId, Recipe>,
    ingredients: HashMap<IngredientId, Ingredient>,
    movements: Vec<StockMovement>,
    alerts: Vec<StockAlert>,
    closes: Vec<DailyClose>,
    users: HashMap<UserId, StaffAccount>,
}

impl State {
    fn order(&self, id: &OrderId) -> Option<&Order> {
        self.order_index.get(id).and_then(|i| self.orders.get(*i))
    }

    fn active_orders_for_table(&self, table_id: &TableId) -> i64 {
        self.orders
            .iter()
            .filter(|o| o.table_id() == table_id && o.is_active())
            .count() as i64
    }

    fn open_alert_types(&self, ingredient_id: &IngredientId) -> Vec<AlertType> {
        self.alerts
            .iter()
            .filter(|a| a.ingredient_id == *ingredient_id && a.is_open())
            .map(|a| a.alert_type)
            .collect()
    }

    /// Alert a movement that just left `ingredient` at its new level raises,
    /// taking into account alerts already staged in `pending`.
    fn alert_after(
        &self,
        movement_type: MovementType,
        ingredient: &Ingredient,
        pending: &[StockAlert],
    ) -> Option<StockAlert> {
        let mut open = self.open_alert_types(ingredient.id());
        open.extend(
            pending
                .iter()
                .filter(|a| a.ingredient_id == *ingredient.id())
                .map(|a| a.alert_type),
        );
        evaluate_alert(movement_type, ingredient, &open)
            .map(|kind| StockAlert::raise(ingredient, kind, *ingredient.updated_at()))
    }
}

/// Shared in-memory store. Cloning shares the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    pub async fn movement_count(&self) -> usize {
        self.state.lock().await.movements.len()
    }
}
