//! ChangeOrderStatusHandler - moves an order along its lifecycle.
//!
//! Confirming an order consumes recipe stock. The whole change (status,
//! stock, movements, alerts, table release) is one store write; if it fails
//! nothing has happened.

use std::sync::Arc;

use crate::application::handlers::events::EventBatch;
use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthenticatedUser, EventId, IngredientId, OrderId, Role, Timestamp};
use crate::domain::inventory::{
    check_requirements, requirements_for, StockAlert, StockAlertRaised, StockMovement,
    StockRequirement,
};
use crate::domain::order::{Order, OrderError, OrderStatus, OrderStatusChanged};
use crate::domain::table::{TableChangeReason, TableStatus, TableStatusChanged};
use crate::ports::{
    EventPublisher, InventoryRepository, MenuRepository, OrderRepository, StatusChange,
};

use super::store_error;

#[derive(Debug, Clone)]
pub struct ChangeOrderStatusCommand {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct ChangeOrderStatusResult {
    pub order: Order,
    pub table_released: bool,
    pub movements: Vec<StockMovement>,
    pub alerts: Vec<StockAlert>,
}

/// Who may move an order into `target`.
fn allowed_roles(target: OrderStatus) -> &'static [Role] {
    match target {
        OrderStatus::Confirmed => &[Role::Admin, Role::Manager, Role::Waiter, Role::Kitchen],
        OrderStatus::Preparing | OrderStatus::Ready => &[Role::Admin, Role::Manager, Role::Kitchen],
        OrderStatus::Delivered | OrderStatus::Cancelled => {
            &[Role::Admin, Role::Manager, Role::Waiter]
        }
        // Never a valid target; let the transition check say so.
        OrderStatus::Pending => &Role::STAFF,
    }
}

pub struct ChangeOrderStatusHandler {
    orders: Arc<dyn OrderRepository>,
    menu: Arc<dyn MenuRepository>,
    inventory: Arc<dyn InventoryRepository>,
    lock: Arc<LockGuard>,
    publisher: Arc<dyn EventPublisher>,
}

impl ChangeOrderStatusHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        menu: Arc<dyn MenuRepository>,
        inventory: Arc<dyn InventoryRepository>,
        lock: Arc<LockGuard>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            orders,
            menu,
            inventory,
            lock,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ChangeOrderStatusCommand,
        actor: &AuthenticatedUser,
    ) -> Result<ChangeOrderStatusResult, OrderError> {
        actor.require_any(allowed_roles(cmd.status))?;
        self.lock.check(LockCategory::OrderUpdate, actor).await?;

        // 1. Load and validate the transition
        let mut order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or(OrderError::NotFound(cmd.order_id))?;
        let from = order.status();
        order.check_transition(cmd.status)?;

        // 2. Validate stock for every ingredient before writing anything
        let deductions = if cmd.status.deducts_stock() {
            self.stock_requirements(&order).await?
        } else {
            Vec::new()
        };

        // 3. One atomic write
        let change = StatusChange {
            order_id: cmd.order_id,
            table_id: *order.table_id(),
            expected: from,
            target: cmd.status,
            deductions,
            changed_by: actor.id.clone(),
            changed_at: Timestamp::now(),
        };
        let outcome = self
            .orders
            .apply_status_change(&change)
            .await
            .map_err(|err| store_error(cmd.order_id, err))?;
        order.apply_transition(cmd.status, change.changed_at)?;

        let table_released = outcome.released_from.is_some();
        tracing::info!(
            order_id = %order.id(),
            from = %from,
            to = %cmd.status,
            movements = outcome.movements.len(),
            table_released,
            user_id = %actor.id,
            "Order status changed"
        );

        // 4. Publish what happened
        let mut batch = EventBatch::new(actor);
        batch.push(&OrderStatusChanged {
            event_id: EventId::new(),
            order_id: *order.id(),
            table_id: *order.table_id(),
            table_number: order.table_number(),
            from,
            to: cmd.status,
            changed_by: actor.id.clone(),
            table_released,
            changed_at: change.changed_at,
        });
        if let Some(previous) = outcome.released_from {
            batch.push(&TableStatusChanged::new(
                *order.table_id(),
                order.table_number(),
                previous,
                TableStatus::Available,
                TableChangeReason::OrdersClosed,
            ));
        }
        for alert in &outcome.alerts {
            tracing::warn!(
                ingredient = %alert.ingredient_name,
                alert_type = %alert.alert_type,
                current_stock = %alert.current_stock,
                "Stock alert raised"
            );
            batch.push(&StockAlertRaised::from(alert));
        }
        batch.publish(self.publisher.as_ref()).await;

        Ok(ChangeOrderStatusResult {
            order,
            table_released,
            movements: outcome.movements,
            alerts: outcome.alerts,
        })
    }

    async fn stock_requirements(&self, order: &Order) -> Result<Vec<StockRequirement>, OrderError> {
        let quantities = order.quantities_by_product();
        let product_ids: Vec<_> = quantities.iter().map(|(id, _)| *id).collect();
        let recipes = self.menu.recipes_for(&product_ids).await?;
        let requirements = requirements_for(&quantities, &recipes);
        if requirements.is_empty() {
            return Ok(requirements);
        }

        let ingredient_ids: Vec<IngredientId> =
            requirements.iter().map(|r| r.ingredient_id).collect();
        let stock = self.inventory.find_ingredients(&ingredient_ids).await?;
        check_requirements(&requirements, &stock).map_err(OrderError::InsufficientStock)?;
        Ok(requirements)
    }
}
