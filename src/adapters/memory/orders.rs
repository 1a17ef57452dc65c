//! OrderRepository over the in-memory store.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, TableId, Timestamp};
use crate::domain::inventory::{MovementType, StockMovement};
use crate::domain::order::{Order, OrderError, Payment};
use crate::domain::table::{TableError, TableStatus};
use crate::ports::{
    OrderFilter, OrderRepository, Page, PageRequest, StatusChange, StatusChangeOutcome,
};

use super::MemoryStore;

fn table_not_found(id: &TableId) -> DomainError {
    DomainError::new(ErrorCode::TableNotFound, format!("Table not found: {}", id))
}

fn order_not_found(id: &OrderId) -> DomainError {
    DomainError::new(ErrorCode::OrderNotFound, format!("Order not found: {}", id))
}

fn table_error(err: TableError) -> DomainError {
    DomainError::new(err.code(), err.to_string())
}

fn matches(order: &Order, filter: &OrderFilter) -> bool {
    filter.status.map_or(true, |s| order.status() == s)
        && filter.table_id.map_or(true, |t| *order.table_id() == t)
        && (!filter.active_only || order.is_active())
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create(&self, order: &Order) -> Result<Option<TableStatus>, DomainError> {
        let mut state = self.state.lock().await;
        let table = state
            .tables
            .get(order.table_id())
            .ok_or_else(|| table_not_found(order.table_id()))?;
        if table.status() == TableStatus::OutOfService {
            return Err(DomainError::new(
                ErrorCode::TableUnavailable,
                format!("Table {} is out of service", table.number()),
            )
            .with_detail("table_number", table.number().to_string())
            .with_detail("status", table.status().to_string()));
        }

        let mut table = table.clone();
        let previous = match table.status().after_order_placed() {
            Some(next) => Some(table.change_status(next, 0).map_err(table_error)?),
            None => None,
        };

        state.tables.insert(*table.id(), table);
        let index = state.orders.len();
        state.orders.push(order.clone());
        state.order_index.insert(*order.id(), index);
        Ok(previous)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.state.lock().await.order(id).cloned())
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        let state = self.state.lock().await;
        let matching: Vec<&Order> = state
            .orders
            .iter()
            .rev()
            .filter(|o| matches(o, filter))
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn list_created_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Order>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .iter()
            .filter(|o| *o.created_at() >= from && *o.created_at() < to)
            .cloned()
            .collect())
    }

    async fn count_active(&self) -> Result<i64, DomainError> {
        let state = self.state.lock().await;
        Ok(state.orders.iter().filter(|o| o.is_active()).count() as i64)
    }

    async fn count_active_for_table(&self, table_id: &TableId) -> Result<i64, DomainError> {
        Ok(self.state.lock().await.active_orders_for_table(table_id))
    }

    async fn apply_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<StatusChangeOutcome, DomainError> {
        let mut state = self.state.lock().await;
        let index = *state
            .order_index
            .get(&change.order_id)
            .ok_or_else(|| order_not_found(&change.order_id))?;
        let mut order = state.orders[index].clone();
        if order.status() != change.expected {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                format!(
                    "Order {} is {}, expected {}",
                    change.order_id,
                    order.status(),
                    change.expected
                ),
            ));
        }
        order
            .apply_transition(change.target, change.changed_at)
            .map_err(|err| DomainError::new(ErrorCode::InvalidStateTransition, err.to_string()))?;

        let mut outcome = StatusChangeOutcome::default();
        let mut ingredients = Vec::with_capacity(change.deductions.len());
        for requirement in &change.deductions {
            let mut ingredient = state
                .ingredients
                .get(&requirement.ingredient_id)
                .cloned()
                .ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::InsufficientStock,
                        format!("Ingredient {} is missing", requirement.ingredient_id),
                    )
                })?;
            let stock_change = ingredient.apply_movement(
                MovementType::Out,
                requirement.quantity,
                change.changed_at,
            )?;
            outcome.movements.push(StockMovement::for_order(
                requirement.ingredient_id,
                requirement.quantity,
                stock_change,
                change.order_id,
                change.changed_by.clone(),
                change.changed_at,
            ));
            let alert = state.alert_after(MovementType::Out, &ingredient, &outcome.alerts);
            if let Some(alert) = alert {
                outcome.alerts.push(alert);
            }
            ingredients.push(ingredient);
        }

        let mut released = None;
        if change.may_release_table() {
            let others_active = state.orders.iter().any(|o| {
                o.table_id() == &change.table_id && o.id() != &change.order_id && o.is_active()
            });
            if let Some(table) = state.tables.get(&change.table_id) {
                if !others_active && table.status() != TableStatus::Available {
                    let mut table = table.clone();
                    outcome.released_from = Some(
                        table
                            .change_status(TableStatus::Available, 0)
                            .map_err(table_error)?,
                    );
                    released = Some(table);
                }
            }
        }

        // Every check passed; commit.
        state.orders[index] = order;
        for ingredient in ingredients {
            state.ingredients.insert(*ingredient.id(), ingredient);
        }
        if let Some(table) = released {
            state.tables.insert(*table.id(), table);
        }
        state.movements.extend(outcome.movements.iter().cloned());
        state.alerts.extend(outcome.alerts.iter().cloned());
        Ok(outcome)
    }

    async fn record_payment(&self, id: &OrderId, payment: &Payment) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let index = *state.order_index.get(id).ok_or_else(|| order_not_found(id))?;
        let order = &mut state.orders[index];
        order.record_payment(payment.clone()).map_err(|err| match err {
            OrderError::AlreadyPaid(_) => DomainError::new(ErrorCode::AlreadyPaid, err.to_string()),
            other => DomainError::new(ErrorCode::ConcurrentModification, other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ProductId, UserId};
    use crate::domain::inventory::{Ingredient, Recipe, RecipeLine, StockRequirement};
    use crate::domain::order::{OrderLine, OrderStatus, PaymentMethod};
    use crate::domain::table::Table;
    use crate::ports::{InventoryRepository, TableRepository};
    use rust_decimal::Decimal;

    fn waiter() -> UserId {
        UserId::new("waiter-1").unwrap()
    }

    fn line(product_id: ProductId, quantity: i32) -> OrderLine {
        OrderLine {
            product_id,
            product_name: "Pizza".to_string(),
            unit_price: Decimal::new(1250, 2),
            quantity,
            notes: None,
        }
    }

    async fn store_with_table(number: i32) -> (MemoryStore, Table) {
        let store = MemoryStore::new();
        let table = Table::new(number, 4, "http://localhost:5173").unwrap();
        store.save(&table).await.unwrap();
        (store, table)
    }

    async fn place(store: &MemoryStore, table: &Table) -> Order {
        let lines = vec![line(ProductId::new(), 1)];
        let order = Order::place(*table.id(), table.number(), lines, None, waiter()).unwrap();
        store.create(&order).await.unwrap();
        order
    }

    fn change(order: &Order, expected: OrderStatus, target: OrderStatus) -> StatusChange {
        StatusChange {
            order_id: *order.id(),
            table_id: *order.table_id(),
            expected,
            target,
            deductions: vec![],
            changed_by: waiter(),
            changed_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn create_occupies_an_available_table() {
        let (store, table) = store_with_table(3).await;
        let order = Order::place(*table.id(), 3, vec![line(ProductId::new(), 2)], None, waiter())
            .unwrap();

        let previous = store.create(&order).await.unwrap();

        assert_eq!(previous, Some(TableStatus::Available));
        let stored = TableRepository::find_by_id(&store, table.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), TableStatus::Occupied);
    }

    #[tokio::test]
    async fn create_refuses_out_of_service_table() {
        let (store, table) = store_with_table(5).await;
        store
            .set_status(table.id(), TableStatus::OutOfService, true)
            .await
            .unwrap();
        let order = Order::place(*table.id(), 5, vec![line(ProductId::new(), 1)], None, waiter())
            .unwrap();

        let err = store.create(&order).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::TableUnavailable);
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn table_released_only_when_last_active_order_finishes() {
        let (store, table) = store_with_table(7).await;
        let first = place(&store, &table).await;
        let second = place(&store, &table).await;

        let outcome = store
            .apply_status_change(&change(&first, OrderStatus::Pending, OrderStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(outcome.released_from, None);

        let outcome = store
            .apply_status_change(&change(&second, OrderStatus::Pending, OrderStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(outcome.released_from, Some(TableStatus::Occupied));
        let stored = TableRepository::find_by_id(&store, table.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), TableStatus::Available);
    }

    #[tokio::test]
    async fn stale_expected_status_is_a_concurrent_modification() {
        let (store, table) = store_with_table(2).await;
        let order = place(&store, &table).await;
        store
            .apply_status_change(&change(&order, OrderStatus::Pending, OrderStatus::Confirmed))
            .await
            .unwrap();

        let err = store
            .apply_status_change(&change(&order, OrderStatus::Pending, OrderStatus::Cancelled))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ConcurrentModification);
    }

    #[tokio::test]
    async fn failed_deduction_leaves_status_and_stock_untouched() {
        let (store, table) = store_with_table(9).await;
        let flour = Ingredient::new("Flour", "kg", Decimal::from(10), Decimal::from(2)).unwrap();
        let cheese = Ingredient::new("Cheese", "kg", Decimal::from(1), Decimal::ZERO).unwrap();
        store.save_ingredient(&flour).await.unwrap();
        store.save_ingredient(&cheese).await.unwrap();
        let order = place(&store, &table).await;

        let mut confirm = change(&order, OrderStatus::Pending, OrderStatus::Confirmed);
        confirm.deductions = vec![
            StockRequirement {
                ingredient_id: *flour.id(),
                quantity: Decimal::from(3),
            },
            StockRequirement {
                ingredient_id: *cheese.id(),
                quantity: Decimal::from(2),
            },
        ];
        let err = store.apply_status_change(&confirm).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let stored = OrderRepository::find_by_id(&store, order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Pending);
        let flour_now = store.find_ingredient(flour.id()).await.unwrap().unwrap();
        assert_eq!(flour_now.current_stock(), Decimal::from(10));
        assert_eq!(store.movement_count().await, 0);
    }

    #[tokio::test]
    async fn confirmation_deducts_and_records_movements() {
        let (store, table) = store_with_table(4).await;
        let tomato = Ingredient::new("Tomato", "kg", Decimal::from(5), Decimal::from(10)).unwrap();
        store.save_ingredient(&tomato).await.unwrap();
        let recipe = Recipe::new(
            ProductId::new(),
            vec![RecipeLine {
                ingredient_id: *tomato.id(),
                quantity: Decimal::from(2),
            }],
        )
        .unwrap();
        let order = place(&store, &table).await;

        let mut confirm = change(&order, OrderStatus::Pending, OrderStatus::Confirmed);
        confirm.deductions = vec![StockRequirement {
            ingredient_id: recipe.lines[0].ingredient_id,
            quantity: Decimal::from(2),
        }];
        let outcome = store.apply_status_change(&confirm).await.unwrap();

        assert_eq!(outcome.movements.len(), 1);
        assert_eq!(outcome.movements[0].order_id, Some(*order.id()));
        assert_eq!(outcome.movements[0].resulting_stock, Decimal::from(3));
        assert_eq!(outcome.alerts.len(), 1);
    }

    #[tokio::test]
    async fn second_payment_is_rejected() {
        let (store, table) = store_with_table(6).await;
        let order = place(&store, &table).await;
        for (from, to) in [
            (OrderStatus::Pending, OrderStatus::Confirmed),
            (OrderStatus::Confirmed, OrderStatus::Preparing),
            (OrderStatus::Preparing, OrderStatus::Ready),
            (OrderStatus::Ready, OrderStatus::Delivered),
        ] {
            store.apply_status_change(&change(&order, from, to)).await.unwrap();
        }
        let payment = Payment {
            method: PaymentMethod::Cash,
            received_by: waiter(),
            paid_at: Timestamp::now(),
        };

        store.record_payment(order.id(), &payment).await.unwrap();
        let err = store.record_payment(order.id(), &payment).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::AlreadyPaid);
    }
}
