//! PostgreSQL implementation of OrderRepository.
//!
//! A status change is one transaction: the conditional status update, the
//! stock deductions with their movements and alerts, and the table release
//! either all land or none do.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, OrderId, OrderItemId, ProductId, StateMachine, TableId, Timestamp,
};
use crate::domain::inventory::{MovementType, StockMovement};
use crate::domain::order::{Order, OrderItem, OrderStatus, Payment, PaymentMethod};
use crate::domain::table::TableStatus;
use crate::ports::{
    OrderFilter, OrderRepository, Page, PageRequest, StatusChange, StatusChangeOutcome,
};

use super::inventory::{deduct_stock, insert_movement, lock_ingredient, raise_alert_after};
use super::{column, db_error, parse_column, user_id};

const ORDER_COLUMNS: &str = "id, table_id, table_number, status, total, notes, created_by, \
     payment_method, paid_by, paid_at, created_at, updated_at";

const ACTIVE_STATUSES: &str = "('PENDING', 'CONFIRMED', 'PREPARING', 'READY')";

#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Items of every order in `ids`, in placement order.
    async fn load_items(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderItem>>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, product_name, quantity, unit_price, line_price, notes
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch order items"))?;

        let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in &rows {
            let order_id: Uuid = column(row, "order_id")?;
            items.entry(order_id).or_default().push(OrderItem {
                id: OrderItemId::from_uuid(column(row, "id")?),
                product_id: ProductId::from_uuid(column(row, "product_id")?),
                product_name: column(row, "product_name")?,
                quantity: column(row, "quantity")?,
                unit_price: column(row, "unit_price")?,
                line_price: column(row, "line_price")?,
                notes: column(row, "notes")?,
            });
        }
        Ok(items)
    }

    async fn hydrate(&self, rows: &[PgRow]) -> Result<Vec<Order>, DomainError> {
        let ids = rows
            .iter()
            .map(|row| column::<Uuid>(row, "id"))
            .collect::<Result<Vec<_>, _>>()?;
        let mut items = self.load_items(&ids).await?;
        rows.iter()
            .zip(ids)
            .map(|(row, id)| row_to_order(row, items.remove(&id).unwrap_or_default()))
            .collect()
    }
}

fn order_not_found(id: &OrderId) -> DomainError {
    DomainError::new(ErrorCode::OrderNotFound, format!("Order not found: {}", id))
}

fn row_to_order(row: &PgRow, items: Vec<OrderItem>) -> Result<Order, DomainError> {
    let status: String = column(row, "status")?;
    let payment_method: Option<String> = column(row, "payment_method")?;
    let paid_by: Option<String> = column(row, "paid_by")?;
    let paid_at: Option<DateTime<Utc>> = column(row, "paid_at")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    let updated_at: DateTime<Utc> = column(row, "updated_at")?;

    let payment = match (payment_method, paid_by, paid_at) {
        (Some(method), Some(by), Some(at)) => Some(Payment {
            method: parse_column::<PaymentMethod>(&method, "payment_method")?,
            received_by: user_id(by)?,
            paid_at: Timestamp::from_datetime(at),
        }),
        _ => None,
    };

    Ok(Order::reconstitute(
        OrderId::from_uuid(column(row, "id")?),
        TableId::from_uuid(column(row, "table_id")?),
        column(row, "table_number")?,
        items,
        parse_column::<OrderStatus>(&status, "status")?,
        column(row, "total")?,
        column(row, "notes")?,
        user_id(column(row, "created_by")?)?,
        payment,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}

/// Frees the table once its last active order has finished. Returns the
/// status it left.
async fn release_table_if_idle(
    tx: &mut Transaction<'_, Postgres>,
    table_id: &TableId,
) -> Result<Option<TableStatus>, DomainError> {
    let status: Option<(String,)> =
        sqlx::query_as("SELECT status FROM restaurant_tables WHERE id = $1 FOR UPDATE")
            .bind(table_id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error("Failed to lock table"))?;
    // Tables may be deleted while their orders live on.
    let Some((status,)) = status else {
        return Ok(None);
    };
    let status = parse_column::<TableStatus>(&status, "status")?;
    if status == TableStatus::Available {
        return Ok(None);
    }

    let (active,): (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM orders WHERE table_id = $1 AND status IN {}",
        ACTIVE_STATUSES
    ))
    .bind(table_id.as_uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(db_error("Failed to count active orders"))?;
    if active > 0 {
        return Ok(None);
    }

    sqlx::query("UPDATE restaurant_tables SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(table_id.as_uuid())
        .bind(TableStatus::Available.as_str())
        .execute(&mut **tx)
        .await
        .map_err(db_error("Failed to release table"))?;
    Ok(Some(status))
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &Order) -> Result<Option<TableStatus>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let table: Option<(i32, String)> =
            sqlx::query_as("SELECT number, status FROM restaurant_tables WHERE id = $1 FOR UPDATE")
                .bind(order.table_id().as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock table"))?;
        let (number, status) = table.ok_or_else(|| {
            DomainError::new(
                ErrorCode::TableNotFound,
                format!("Table not found: {}", order.table_id()),
            )
        })?;
        let status = parse_column::<TableStatus>(&status, "status")?;
        if status == TableStatus::OutOfService {
            return Err(DomainError::new(
                ErrorCode::TableUnavailable,
                format!("Table {} is out of service", number),
            )
            .with_detail("table_number", number.to_string())
            .with_detail("status", status.to_string()));
        }

        sqlx::query(&format!(
            "INSERT INTO orders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, NULL, NULL, $8, $9)",
            ORDER_COLUMNS
        ))
        .bind(order.id().as_uuid())
        .bind(order.table_id().as_uuid())
        .bind(order.table_number())
        .bind(order.status().as_str())
        .bind(order.total())
        .bind(order.notes())
        .bind(order.created_by().as_str())
        .bind(order.created_at().as_datetime())
        .bind(order.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert order"))?;

        for (position, item) in order.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, position, product_id, product_name,
                    quantity, unit_price, line_price, notes
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(order.id().as_uuid())
            .bind(position as i32)
            .bind(item.product_id.as_uuid())
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_price)
            .bind(&item.notes)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to insert order item"))?;
        }

        let previous = match status.after_order_placed() {
            Some(next) => {
                sqlx::query(
                    "UPDATE restaurant_tables SET status = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(order.table_id().as_uuid())
                .bind(next.as_str())
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to occupy table"))?;
                Some(status)
            }
            None => None,
        };

        tx.commit()
            .await
            .map_err(db_error("Failed to commit order"))?;
        Ok(previous)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch order"))?;
        match row {
            Some(row) => Ok(self.hydrate(std::slice::from_ref(&row)).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        let condition = format!(
            "($1::text IS NULL OR status = $1) \
             AND ($2::uuid IS NULL OR table_id = $2) \
             AND (NOT $3 OR status IN {})",
            ACTIVE_STATUSES
        );
        let status = filter.status.map(|s| s.as_str());
        let table_id = filter.table_id.map(|id| *id.as_uuid());

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM orders WHERE {}", condition))
                .bind(status)
                .bind(table_id)
                .bind(filter.active_only)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count orders"))?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE {} ORDER BY created_at DESC LIMIT $4 OFFSET $5",
            ORDER_COLUMNS, condition
        ))
        .bind(status)
        .bind(table_id)
        .bind(filter.active_only)
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list orders"))?;

        let orders = self.hydrate(&rows).await?;
        Ok(Page::new(orders, total.max(0) as u64, page))
    }

    async fn list_created_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Order>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE created_at >= $1 AND created_at < $2 ORDER BY created_at",
            ORDER_COLUMNS
        ))
        .bind(from.as_datetime())
        .bind(to.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list orders for period"))?;
        self.hydrate(&rows).await
    }

    async fn count_active(&self) -> Result<i64, DomainError> {
        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM orders WHERE status IN {}",
            ACTIVE_STATUSES
        ))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count active orders"))?;
        Ok(count)
    }

    async fn count_active_for_table(&self, table_id: &TableId) -> Result<i64, DomainError> {
        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM orders WHERE table_id = $1 AND status IN {}",
            ACTIVE_STATUSES
        ))
        .bind(table_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count active orders"))?;
        Ok(count)
    }

    async fn apply_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<StatusChangeOutcome, DomainError> {
        if !change.expected.can_transition_to(&change.target) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot move order from {} to {}", change.expected, change.target),
            ));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let updated = sqlx::query(
            "UPDATE orders SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2",
        )
        .bind(change.order_id.as_uuid())
        .bind(change.expected.as_str())
        .bind(change.target.as_str())
        .bind(change.changed_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update order status"))?;

        if updated.rows_affected() == 0 {
            let current: Option<(String,)> =
                sqlx::query_as("SELECT status FROM orders WHERE id = $1")
                    .bind(change.order_id.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(db_error("Failed to fetch order status"))?;
            return Err(match current {
                None => order_not_found(&change.order_id),
                Some((status,)) => DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!(
                        "Order {} is {}, expected {}",
                        change.order_id, status, change.expected
                    ),
                ),
            });
        }

        let mut outcome = StatusChangeOutcome::default();
        // Deductions arrive sorted by ingredient id, so rows lock in a stable order.
        for requirement in &change.deductions {
            let mut ingredient = lock_ingredient(&mut tx, &requirement.ingredient_id)
                .await?
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
            let movement = StockMovement::for_order(
                requirement.ingredient_id,
                requirement.quantity,
                stock_change,
                change.order_id,
                change.changed_by.clone(),
                change.changed_at,
            );

            deduct_stock(&mut tx, &ingredient, requirement.quantity).await?;
            insert_movement(&mut tx, &movement).await?;
            if let Some(alert) = raise_alert_after(&mut tx, MovementType::Out, &ingredient).await? {
                outcome.alerts.push(alert);
            }
            outcome.movements.push(movement);
        }

        if change.may_release_table() {
            outcome.released_from = release_table_if_idle(&mut tx, &change.table_id).await?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit status change"))?;
        Ok(outcome)
    }

    async fn record_payment(&self, id: &OrderId, payment: &Payment) -> Result<(), DomainError> {
        let updated = sqlx::query(
            r#"
            UPDATE orders SET payment_method = $2, paid_by = $3, paid_at = $4, updated_at = $4
            WHERE id = $1 AND status = 'DELIVERED' AND payment_method IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(payment.method.as_str())
        .bind(payment.received_by.as_str())
        .bind(payment.paid_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to record payment"))?;
        if updated.rows_affected() > 0 {
            return Ok(());
        }

        let current: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT status, payment_method FROM orders WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to fetch order"))?;
        Err(match current {
            None => order_not_found(id),
            Some((_, Some(_))) => {
                DomainError::new(ErrorCode::AlreadyPaid, format!("Order {} is already paid", id))
            }
            Some((status, None)) => DomainError::new(
                ErrorCode::ConcurrentModification,
                format!("Order {} is {} and cannot take a payment", id, status),
            ),
        })
    }
}
