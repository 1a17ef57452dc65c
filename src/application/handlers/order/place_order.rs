//! PlaceOrderHandler - takes a new order for a table.

use std::sync::Arc;

use crate::application::handlers::events::EventBatch;
use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthenticatedUser, ErrorCode, ProductId, Role, TableId};
use crate::domain::order::{Order, OrderCreated, OrderError, OrderLine};
use crate::domain::table::{TableChangeReason, TableStatus, TableStatusChanged};
use crate::ports::{EventPublisher, MenuRepository, OrderRepository, TableRepository};

const ORDER_TAKERS: &[Role] = &[Role::Admin, Role::Manager, Role::Waiter, Role::Cashier];

#[derive(Debug, Clone)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlaceOrderCommand {
    pub table_id: TableId,
    pub items: Vec<OrderItemRequest>,
    pub notes: Option<String>,
}

pub struct PlaceOrderHandler {
    tables: Arc<dyn TableRepository>,
    menu: Arc<dyn MenuRepository>,
    orders: Arc<dyn OrderRepository>,
    lock: Arc<LockGuard>,
    publisher: Arc<dyn EventPublisher>,
}

impl PlaceOrderHandler {
    pub fn new(
        tables: Arc<dyn TableRepository>,
        menu: Arc<dyn MenuRepository>,
        orders: Arc<dyn OrderRepository>,
        lock: Arc<LockGuard>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            tables,
            menu,
            orders,
            lock,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: PlaceOrderCommand,
        actor: &AuthenticatedUser,
    ) -> Result<Order, OrderError> {
        actor.require_any(ORDER_TAKERS)?;
        self.lock.check(LockCategory::OrderCreation, actor).await?;

        let table = self
            .tables
            .find_by_id(&cmd.table_id)
            .await?
            .ok_or(OrderError::TableNotFound(cmd.table_id))?;
        table
            .ensure_accepts_orders()
            .map_err(|_| OrderError::TableUnavailable {
                number: table.number(),
                status: table.status(),
            })?;

        let lines = self.resolve_lines(cmd.items).await?;
        let order = Order::place(cmd.table_id, table.number(), lines, cmd.notes, actor.id.clone())?;

        let previous = self.orders.create(&order).await.map_err(|err| match err.code {
            ErrorCode::TableNotFound => OrderError::TableNotFound(cmd.table_id),
            _ => err.into(),
        })?;

        tracing::info!(
            order_id = %order.id(),
            table = table.number(),
            items = order.items().len(),
            total = %order.total(),
            user_id = %actor.id,
            "Order placed"
        );

        let mut batch = EventBatch::new(actor);
        batch.push(&OrderCreated::from_order(&order));
        if let Some(from) = previous {
            batch.push(&TableStatusChanged::new(
                cmd.table_id,
                table.number(),
                from,
                TableStatus::Occupied,
                TableChangeReason::OrderPlaced,
            ));
        }
        batch.publish(self.publisher.as_ref()).await;

        Ok(order)
    }

    /// Looks every product up once and snapshots name and price into lines.
    async fn resolve_lines(
        &self,
        items: Vec<OrderItemRequest>,
    ) -> Result<Vec<OrderLine>, OrderError> {
        let mut ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
        ids.sort();
        ids.dedup();
        let products = self.menu.find_products(&ids).await?;

        items
            .into_iter()
            .map(|item| {
                let product = products
                    .iter()
                    .find(|p| *p.id() == item.product_id)
                    .ok_or(OrderError::ProductNotFound(item.product_id))?;
                if !product.is_available() {
                    return Err(OrderError::ProductUnavailable(product.name().to_string()));
                }
                Ok(product.order_line(item.quantity, item.notes))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{user, Fixture};
    use crate::domain::menu::ProductChanges;
    use crate::domain::order::OrderStatus;
    use rust_decimal::Decimal;

    fn handler(fx: &Fixture) -> PlaceOrderHandler {
        PlaceOrderHandler::new(
            fx.store.clone(),
            fx.store.clone(),
            fx.store.clone(),
            fx.lock.clone(),
            fx.bus.clone(),
        )
    }

    fn item(product_id: ProductId, quantity: i32) -> OrderItemRequest {
        OrderItemRequest {
            product_id,
            quantity,
            notes: None,
        }
    }

    #[tokio::test]
    async fn order_on_available_table_occupies_it() {
        let fx = Fixture::new();
        let table = fx.table(3).await;
        let pizza = fx.product("Pizza", "12.50").await;
        let soda = fx.product("Soda", "2.00").await;

        let order = handler(&fx)
            .handle(
                PlaceOrderCommand {
                    table_id: *table.id(),
                    items: vec![item(*pizza.id(), 2), item(*soda.id(), 1)],
                    notes: None,
                },
                &user(Role::Waiter),
            )
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total(), "27.00".parse::<Decimal>().unwrap());
        let stored = TableRepository::find_by_id(fx.store.as_ref(), table.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status(), TableStatus::Occupied);
        assert!(fx.bus.has_event("order.created.v1"));
        assert!(fx.bus.has_event("table.status_changed.v1"));
    }

    #[tokio::test]
    async fn occupied_table_stays_and_emits_no_table_event() {
        let fx = Fixture::new();
        let table = fx.table(4).await;
        let pizza = fx.product("Pizza", "10").await;
        let handler = handler(&fx);
        let cmd = PlaceOrderCommand {
            table_id: *table.id(),
            items: vec![item(*pizza.id(), 1)],
            notes: None,
        };

        handler.handle(cmd.clone(), &user(Role::Waiter)).await.unwrap();
        handler.handle(cmd, &user(Role::Waiter)).await.unwrap();

        assert_eq!(fx.bus.events_of_type("table.status_changed.v1").len(), 1);
        assert_eq!(fx.bus.events_of_type("order.created.v1").len(), 2);
    }

    #[tokio::test]
    async fn unavailable_product_is_rejected() {
        let fx = Fixture::new();
        let table = fx.table(5).await;
        let mut pizza = fx.product("Pizza", "10").await;
        pizza
            .apply(ProductChanges {
                available: Some(false),
                ..Default::default()
            })
            .unwrap();
        fx.store.update_product(&pizza).await.unwrap();

        let err = handler(&fx)
            .handle(
                PlaceOrderCommand {
                    table_id: *table.id(),
                    items: vec![item(*pizza.id(), 1)],
                    notes: None,
                },
                &user(Role::Waiter),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::ProductUnavailable(name) if name == "Pizza"));
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_table_and_product_are_not_found() {
        let fx = Fixture::new();
        let table = fx.table(6).await;
        let handler = handler(&fx);

        let err = handler
            .handle(
                PlaceOrderCommand {
                    table_id: TableId::new(),
                    items: vec![],
                    notes: None,
                },
                &user(Role::Waiter),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::TableNotFound(_)));

        let err = handler
            .handle(
                PlaceOrderCommand {
                    table_id: *table.id(),
                    items: vec![item(ProductId::new(), 1)],
                    notes: None,
                },
                &user(Role::Waiter),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn kitchen_cannot_take_orders() {
        let fx = Fixture::new();
        let table = fx.table(7).await;

        let err = handler(&fx)
            .handle(
                PlaceOrderCommand {
                    table_id: *table.id(),
                    items: vec![],
                    notes: None,
                },
                &user(Role::Kitchen),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Forbidden(_)));
    }

    #[tokio::test]
    async fn closed_day_locks_order_creation() {
        let fx = Fixture::new();
        let table = fx.table(8).await;
        let pizza = fx.product("Pizza", "10").await;
        fx.close_today().await;

        let err = handler(&fx)
            .handle(
                PlaceOrderCommand {
                    table_id: *table.id(),
                    items: vec![item(*pizza.id(), 1)],
                    notes: None,
                },
                &user(Role::Admin),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Locked(LockCategory::OrderCreation)));
        assert!(fx.bus.published_events().is_empty());
    }
}
