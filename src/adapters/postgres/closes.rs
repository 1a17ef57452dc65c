//! PostgreSQL implementation of DailyCloseRepository.
//!
//! The partial unique index `daily_closes_active_key` is what keeps two
//! concurrent closes of one business date from both landing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::daily_close::{DailyClose, DayTotals};
use crate::domain::foundation::{DailyCloseId, DomainError, ErrorCode, Timestamp};
use crate::ports::DailyCloseRepository;

use super::{column, db_error, is_unique_violation, user_id};

const CLOSE_COLUMNS: &str = "id, business_date, closed_by, order_count, delivered_count, \
     cancelled_count, revenue, cash_revenue, card_revenue, transfer_revenue, unpaid_revenue, \
     notes, closed_at, reopened_at, reopened_by";

#[derive(Clone)]
pub struct PostgresDailyCloseRepository {
    pool: PgPool,
}

impl PostgresDailyCloseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_close(row: &PgRow) -> Result<DailyClose, DomainError> {
    let closed_at: DateTime<Utc> = column(row, "closed_at")?;
    let reopened_at: Option<DateTime<Utc>> = column(row, "reopened_at")?;
    let reopened_by: Option<String> = column(row, "reopened_by")?;
    let totals = DayTotals {
        order_count: column(row, "order_count")?,
        delivered_count: column(row, "delivered_count")?,
        cancelled_count: column(row, "cancelled_count")?,
        revenue: column(row, "revenue")?,
        cash_revenue: column(row, "cash_revenue")?,
        card_revenue: column(row, "card_revenue")?,
        transfer_revenue: column(row, "transfer_revenue")?,
        unpaid_revenue: column(row, "unpaid_revenue")?,
    };
    Ok(DailyClose::reconstitute(
        DailyCloseId::from_uuid(column(row, "id")?),
        column(row, "business_date")?,
        user_id(column(row, "closed_by")?)?,
        totals,
        column(row, "notes")?,
        Timestamp::from_datetime(closed_at),
        reopened_at.map(Timestamp::from_datetime),
        reopened_by.map(user_id).transpose()?,
    ))
}

#[async_trait]
impl DailyCloseRepository for PostgresDailyCloseRepository {
    async fn save(&self, close: &DailyClose) -> Result<(), DomainError> {
        let totals = close.totals();
        sqlx::query(&format!(
            "INSERT INTO daily_closes ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NULL, NULL)",
            CLOSE_COLUMNS
        ))
        .bind(close.id().as_uuid())
        .bind(close.business_date())
        .bind(close.closed_by().as_str())
        .bind(totals.order_count)
        .bind(totals.delivered_count)
        .bind(totals.cancelled_count)
        .bind(totals.revenue)
        .bind(totals.cash_revenue)
        .bind(totals.card_revenue)
        .bind(totals.transfer_revenue)
        .bind(totals.unpaid_revenue)
        .bind(close.notes())
        .bind(close.closed_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::DayAlreadyClosed,
                    format!("Business day {} is already closed", close.business_date()),
                )
                .with_detail("business_date", close.business_date().to_string())
            } else {
                DomainError::database("Failed to insert daily close", e)
            }
        })?;
        Ok(())
    }

    async fn mark_reopened(&self, close: &DailyClose) -> Result<(), DomainError> {
        let (Some(reopened_at), Some(reopened_by)) = (close.reopened_at(), close.reopened_by())
        else {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Daily close {} carries no reopening", close.id()),
            ));
        };

        let updated = sqlx::query(
            r#"
            UPDATE daily_closes SET reopened_at = $2, reopened_by = $3
            WHERE id = $1 AND reopened_at IS NULL
            "#,
        )
        .bind(close.id().as_uuid())
        .bind(reopened_at.as_datetime())
        .bind(reopened_by.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to reopen daily close"))?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                format!("Daily close {} is no longer active", close.id()),
            ));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &DailyCloseId) -> Result<Option<DailyClose>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM daily_closes WHERE id = $1",
            CLOSE_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch daily close"))?;
        row.as_ref().map(row_to_close).transpose()
    }

    async fn find_active_for(&self, date: NaiveDate) -> Result<Option<DailyClose>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM daily_closes WHERE business_date = $1 AND reopened_at IS NULL",
            CLOSE_COLUMNS
        ))
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch daily close"))?;
        row.as_ref().map(row_to_close).transpose()
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<DailyClose>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM daily_closes ORDER BY closed_at DESC LIMIT $1",
            CLOSE_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list daily closes"))?;
        rows.iter().map(row_to_close).collect()
    }
}
