//! RecordPaymentHandler - settles a delivered order.

use std::sync::Arc;

use crate::application::handlers::events::EventBatch;
use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthenticatedUser, EventId, OrderId, Role, Timestamp};
use crate::domain::order::{Order, OrderError, OrderPaid, Payment, PaymentMethod};
use crate::ports::{EventPublisher, OrderRepository};

use super::store_error;

const CASHIERS: &[Role] = &[Role::Admin, Role::Manager, Role::Cashier, Role::Waiter];

#[derive(Debug, Clone)]
pub struct RecordPaymentCommand {
    pub order_id: OrderId,
    pub method: PaymentMethod,
}

pub struct RecordPaymentHandler {
    orders: Arc<dyn OrderRepository>,
    lock: Arc<LockGuard>,
    publisher: Arc<dyn EventPublisher>,
}

impl RecordPaymentHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        lock: Arc<LockGuard>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            orders,
            lock,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordPaymentCommand,
        actor: &AuthenticatedUser,
    ) -> Result<Order, OrderError> {
        actor.require_any(CASHIERS)?;
        self.lock.check(LockCategory::Payment, actor).await?;

        let mut order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or(OrderError::NotFound(cmd.order_id))?;
        order.check_payable()?;

        let payment = Payment {
            method: cmd.method,
            received_by: actor.id.clone(),
            paid_at: Timestamp::now(),
        };
        self.orders
            .record_payment(&cmd.order_id, &payment)
            .await
            .map_err(|err| store_error(cmd.order_id, err))?;
        order.record_payment(payment.clone())?;

        tracing::info!(
            order_id = %order.id(),
            method = %payment.method,
            amount = %order.total(),
            user_id = %actor.id,
            "Payment recorded"
        );

        let mut batch = EventBatch::new(actor);
        batch.push(&OrderPaid {
            event_id: EventId::new(),
            order_id: *order.id(),
            table_number: order.table_number(),
            method: payment.method,
            amount: order.total(),
            paid_at: payment.paid_at,
        });
        batch.publish(self.publisher.as_ref()).await;

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::order::{
        ChangeOrderStatusCommand, ChangeOrderStatusHandler, OrderItemRequest, PlaceOrderCommand,
        PlaceOrderHandler,
    };
    use crate::application::handlers::test_support::{user, Fixture};
    use crate::domain::order::OrderStatus;

    async fn order_in(fx: &Fixture, statuses: &[OrderStatus]) -> Order {
        let table = fx.table(10).await;
        let soda = fx.product("Soda", "2.50").await;
        let order = PlaceOrderHandler::new(
            fx.store.clone(),
            fx.store.clone(),
            fx.store.clone(),
            fx.lock.clone(),
            fx.bus.clone(),
        )
        .handle(
            PlaceOrderCommand {
                table_id: *table.id(),
                items: vec![OrderItemRequest {
                    product_id: *soda.id(),
                    quantity: 2,
                    notes: None,
                }],
                notes: None,
            },
            &user(Role::Waiter),
        )
        .await
        .unwrap();

        let changer = ChangeOrderStatusHandler::new(
            fx.store.clone(),
            fx.store.clone(),
            fx.store.clone(),
            fx.lock.clone(),
            fx.bus.clone(),
        );
        for status in statuses {
            changer
                .handle(
                    ChangeOrderStatusCommand {
                        order_id: *order.id(),
                        status: *status,
                    },
                    &user(Role::Admin),
                )
                .await
                .unwrap();
        }
        order
    }

    fn handler(fx: &Fixture) -> RecordPaymentHandler {
        RecordPaymentHandler::new(fx.store.clone(), fx.lock.clone(), fx.bus.clone())
    }

    const TO_DELIVERED: [OrderStatus; 4] = [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ];

    #[tokio::test]
    async fn delivered_order_is_paid_once() {
        let fx = Fixture::new();
        let order = order_in(&fx, &TO_DELIVERED).await;
        let cmd = RecordPaymentCommand {
            order_id: *order.id(),
            method: PaymentMethod::Card,
        };

        let paid = handler(&fx).handle(cmd.clone(), &user(Role::Cashier)).await.unwrap();
        assert_eq!(paid.payment().map(|p| p.method), Some(PaymentMethod::Card));
        assert!(fx.bus.has_event("order.paid.v1"));

        let err = handler(&fx).handle(cmd, &user(Role::Cashier)).await.unwrap_err();
        assert!(matches!(err, OrderError::AlreadyPaid(_)));
    }

    #[tokio::test]
    async fn undelivered_order_is_not_payable() {
        let fx = Fixture::new();
        let order = order_in(&fx, &[OrderStatus::Confirmed]).await;

        let err = handler(&fx)
            .handle(
                RecordPaymentCommand {
                    order_id: *order.id(),
                    method: PaymentMethod::Cash,
                },
                &user(Role::Cashier),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::NotPayable(OrderStatus::Confirmed)));
    }

    #[tokio::test]
    async fn payment_is_locked_after_close() {
        let fx = Fixture::new();
        let order = order_in(&fx, &TO_DELIVERED).await;
        fx.close_today().await;

        let err = handler(&fx)
            .handle(
                RecordPaymentCommand {
                    order_id: *order.id(),
                    method: PaymentMethod::Cash,
                },
                &user(Role::Admin),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Locked(LockCategory::Payment)));
    }
}
