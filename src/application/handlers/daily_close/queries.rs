//! Read side of the daily close. Never gated.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::application::LockGuard;
use crate::domain::daily_close::{DailyClose, DailyCloseError, DayTotals};
use crate::domain::foundation::{AuthenticatedUser, Role};
use crate::ports::{DailyCloseRepository, OrderRepository};

const REPORT_READERS: &[Role] = &[Role::Admin, Role::Manager, Role::Cashier];

/// Today's lock state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseStatus {
    pub business_date: NaiveDate,
    pub locked: bool,
    pub close: Option<DailyClose>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub business_date: NaiveDate,
    pub closed: bool,
    pub totals: DayTotals,
}

pub struct DailyCloseStatusHandler {
    closes: Arc<dyn DailyCloseRepository>,
    lock: Arc<LockGuard>,
}

impl DailyCloseStatusHandler {
    pub fn new(closes: Arc<dyn DailyCloseRepository>, lock: Arc<LockGuard>) -> Self {
        Self { closes, lock }
    }

    pub async fn handle(&self, actor: &AuthenticatedUser) -> Result<CloseStatus, DailyCloseError> {
        actor.require_any(&Role::STAFF)?;
        let today = self.lock.calendar().today();
        let close = self.closes.find_active_for(today).await?;
        Ok(CloseStatus {
            business_date: today,
            locked: close.is_some(),
            close,
        })
    }
}

pub struct ListClosesHandler {
    closes: Arc<dyn DailyCloseRepository>,
}

impl ListClosesHandler {
    pub fn new(closes: Arc<dyn DailyCloseRepository>) -> Self {
        Self { closes }
    }

    pub async fn handle(
        &self,
        limit: u32,
        actor: &AuthenticatedUser,
    ) -> Result<Vec<DailyClose>, DailyCloseError> {
        actor.require_any(&[Role::Admin, Role::Manager])?;
        Ok(self.closes.list_recent(limit.clamp(1, 100)).await?)
    }
}

/// Totals for any business date, computed from the orders themselves.
pub struct DailyReportHandler {
    orders: Arc<dyn OrderRepository>,
    closes: Arc<dyn DailyCloseRepository>,
    lock: Arc<LockGuard>,
}

impl DailyReportHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        closes: Arc<dyn DailyCloseRepository>,
        lock: Arc<LockGuard>,
    ) -> Self {
        Self {
            orders,
            closes,
            lock,
        }
    }

    pub async fn handle(
        &self,
        date: Option<NaiveDate>,
        actor: &AuthenticatedUser,
    ) -> Result<DailyReport, DailyCloseError> {
        actor.require_any(REPORT_READERS)?;
        let calendar = self.lock.calendar();
        let business_date = date.unwrap_or_else(|| calendar.today());
        let (from, to) = calendar.bounds(business_date);
        let orders = self.orders.list_created_between(from, to).await?;
        let closed = self.closes.find_active_for(business_date).await?.is_some();

        Ok(DailyReport {
            business_date,
            closed,
            totals: DayTotals::from_orders(&orders),
        })
    }
}
