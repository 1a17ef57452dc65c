//! PostgreSQL implementation of TableRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, TableId, Timestamp};
use crate::domain::table::{Table, TableStatus};
use crate::ports::TableRepository;

use super::{column, db_error, is_unique_violation, parse_column};

const ACTIVE_ORDERS_FOR_TABLE: &str = r#"
    SELECT COUNT(*) FROM orders
    WHERE table_id = $1 AND status IN ('PENDING', 'CONFIRMED', 'PREPARING', 'READY')
"#;

#[derive(Clone)]
pub struct PostgresTableRepository {
    pool: PgPool,
}

impl PostgresTableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(id: &TableId) -> DomainError {
    DomainError::new(ErrorCode::TableNotFound, format!("Table not found: {}", id))
}

fn busy(number: i32, active: i64) -> DomainError {
    DomainError::new(
        ErrorCode::TableBusy,
        format!("Table {} still has {} active order(s)", number, active),
    )
    .with_detail("number", number.to_string())
    .with_detail("active_orders", active.to_string())
}

pub(super) fn row_to_table(row: &PgRow) -> Result<Table, DomainError> {
    let status: String = column(row, "status")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    Ok(Table::reconstitute(
        TableId::from_uuid(column::<Uuid>(row, "id")?),
        column(row, "number")?,
        column(row, "capacity")?,
        parse_column::<TableStatus>(&status, "status")?,
        column(row, "qr_payload")?,
        Timestamp::from_datetime(created_at),
    ))
}

/// Locks the table row and counts its active orders.
async fn lock_with_active_count(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: &TableId,
) -> Result<(i32, i64), DomainError> {
    let number: Option<(i32,)> =
        sqlx::query_as("SELECT number FROM restaurant_tables WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error("Failed to lock table"))?;
    let (number,) = number.ok_or_else(|| not_found(id))?;

    let (active,): (i64,) = sqlx::query_as(ACTIVE_ORDERS_FOR_TABLE)
        .bind(id.as_uuid())
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error("Failed to count active orders"))?;
    Ok((number, active))
}

#[async_trait]
impl TableRepository for PostgresTableRepository {
    async fn save(&self, table: &Table) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO restaurant_tables (id, number, capacity, status, qr_payload, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(table.id().as_uuid())
        .bind(table.number())
        .bind(table.capacity())
        .bind(table.status().as_str())
        .bind(table.qr_payload())
        .bind(table.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::AlreadyExists,
                    format!("Table number {} is already in use", table.number()),
                )
                .with_detail("number", table.number().to_string())
            } else {
                DomainError::database("Failed to insert table", e)
            }
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &TableId) -> Result<Option<Table>, DomainError> {
        let row = sqlx::query(
            "SELECT id, number, capacity, status, qr_payload, created_at FROM restaurant_tables WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch table"))?;
        row.as_ref().map(row_to_table).transpose()
    }

    async fn list(&self) -> Result<Vec<Table>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, number, capacity, status, qr_payload, created_at FROM restaurant_tables ORDER BY number",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list tables"))?;
        rows.iter().map(row_to_table).collect()
    }

    async fn set_status(
        &self,
        id: &TableId,
        status: TableStatus,
        require_idle: bool,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let (number, active) = lock_with_active_count(&mut tx, id).await?;
        if require_idle && active > 0 {
            return Err(busy(number, active));
        }

        sqlx::query("UPDATE restaurant_tables SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to update table status"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit table status"))
    }

    async fn delete(&self, id: &TableId) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let (number, active) = lock_with_active_count(&mut tx, id).await?;
        if active > 0 {
            return Err(busy(number, active));
        }

        sqlx::query("DELETE FROM restaurant_tables WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete table"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit table delete"))
    }
}
