//! Order queries. Reads are never gated by the daily close.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, OrderId, Role};
use crate::domain::order::{Order, OrderError};
use crate::ports::{OrderFilter, OrderRepository, Page, PageRequest};

#[derive(Debug, Clone, Default)]
pub struct ListOrdersQuery {
    pub filter: OrderFilter,
    pub page: PageRequest,
}

pub struct GetOrderHandler {
    orders: Arc<dyn OrderRepository>,
}

impl GetOrderHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn handle(
        &self,
        id: OrderId,
        actor: &AuthenticatedUser,
    ) -> Result<Order, OrderError> {
        actor.require_any(&Role::STAFF)?;
        self.orders
            .find_by_id(&id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }
}

pub struct ListOrdersHandler {
    orders: Arc<dyn OrderRepository>,
}

impl ListOrdersHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn handle(
        &self,
        query: ListOrdersQuery,
        actor: &AuthenticatedUser,
    ) -> Result<Page<Order>, OrderError> {
        actor.require_any(&Role::STAFF)?;
        Ok(self.orders.list(&query.filter, query.page).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{user, Fixture};
    use crate::domain::foundation::UserId;
    use crate::domain::order::OrderStatus;
    use crate::domain::order::OrderLine;
    use rust_decimal::Decimal;

    async fn seed(fx: &Fixture, count: usize) {
        let table = fx.table(11).await;
        let pizza = fx.product("Pizza", "9").await;
        for _ in 0..count {
            let order = Order::place(
                *table.id(),
                table.number(),
                vec![OrderLine {
                    product_id: *pizza.id(),
                    product_name: "Pizza".to_string(),
                    unit_price: Decimal::from(9),
                    quantity: 1,
                    notes: None,
                }],
                None,
                UserId::new("waiter-1").unwrap(),
            )
            .unwrap();
            fx.store.create(&order).await.unwrap();
        }
    }

    #[tokio::test]
    async fn lists_are_paged() {
        let fx = Fixture::new();
        seed(&fx, 5).await;

        let page = ListOrdersHandler::new(fx.store.clone())
            .handle(
                ListOrdersQuery {
                    filter: OrderFilter {
                        status: Some(OrderStatus::Pending),
                        ..Default::default()
                    },
                    page: PageRequest::new(2, 2).unwrap(),
                },
                &user(Role::Kitchen),
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.info().total_pages, 3);
    }

    #[tokio::test]
    async fn customers_cannot_read_orders() {
        let fx = Fixture::new();

        let err = GetOrderHandler::new(fx.store.clone())
            .handle(OrderId::new(), &user(Role::Customer))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));

        let err = GetOrderHandler::new(fx.store.clone())
            .handle(OrderId::new(), &user(Role::Waiter))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }
}
