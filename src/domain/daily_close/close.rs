//! Daily close record and the day's totals.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DailyCloseId, Timestamp, UserId};
use crate::domain::order::{Order, OrderStatus, PaymentMethod};

use super::DailyCloseError;

/// Aggregated figures for one business day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTotals {
    pub order_count: i64,
    pub delivered_count: i64,
    pub cancelled_count: i64,
    /// Sum of DELIVERED order totals.
    pub revenue: Decimal,
    pub cash_revenue: Decimal,
    pub card_revenue: Decimal,
    pub transfer_revenue: Decimal,
    /// Delivered but not yet paid.
    pub unpaid_revenue: Decimal,
}

impl DayTotals {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut totals = DayTotals::default();
        for order in orders {
            totals.order_count += 1;
            match order.status() {
                OrderStatus::Cancelled => totals.cancelled_count += 1,
                OrderStatus::Delivered => {
                    totals.delivered_count += 1;
                    totals.revenue += order.total();
                    match order.payment().map(|p| p.method) {
                        Some(PaymentMethod::Cash) => totals.cash_revenue += order.total(),
                        Some(PaymentMethod::Card) => totals.card_revenue += order.total(),
                        Some(PaymentMethod::Transfer) => totals.transfer_revenue += order.total(),
                        None => totals.unpaid_revenue += order.total(),
                    }
                }
                _ => {}
            }
        }
        totals
    }
}

/// # Invariants
///
/// - at most one close per business date without `reopened_at` (store enforced)
/// - once reopened, a close stays reopened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClose {
    id: DailyCloseId,
    business_date: NaiveDate,
    closed_by: UserId,
    totals: DayTotals,
    notes: Option<String>,
    closed_at: Timestamp,
    reopened_at: Option<Timestamp>,
    reopened_by: Option<UserId>,
}

impl DailyClose {
    /// Closes `business_date`. Refused while any order is still active.
    pub fn close(
        business_date: NaiveDate,
        closed_by: UserId,
        totals: DayTotals,
        active_orders: i64,
        notes: Option<String>,
    ) -> Result<Self, DailyCloseError> {
        if active_orders > 0 {
            return Err(DailyCloseError::OrdersStillActive(active_orders));
        }
        Ok(Self {
            id: DailyCloseId::new(),
            business_date,
            closed_by,
            totals,
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            closed_at: Timestamp::now(),
            reopened_at: None,
            reopened_by: None,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: DailyCloseId,
        business_date: NaiveDate,
        closed_by: UserId,
        totals: DayTotals,
        notes: Option<String>,
        closed_at: Timestamp,
        reopened_at: Option<Timestamp>,
        reopened_by: Option<UserId>,
    ) -> Self {
        Self {
            id,
            business_date,
            closed_by,
            totals,
            notes,
            closed_at,
            reopened_at,
            reopened_by,
        }
    }

    pub fn id(&self) -> &DailyCloseId {
        &self.id
    }

    pub fn business_date(&self) -> NaiveDate {
        self.business_date
    }

    pub fn closed_by(&self) -> &UserId {
        &self.closed_by
    }

    pub fn totals(&self) -> &DayTotals {
        &self.totals
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn closed_at(&self) -> &Timestamp {
        &self.closed_at
    }

    pub fn reopened_at(&self) -> Option<&Timestamp> {
        self.reopened_at.as_ref()
    }

    pub fn reopened_by(&self) -> Option<&UserId> {
        self.reopened_by.as_ref()
    }

    /// An active close locks mutations for its date.
    pub fn is_active(&self) -> bool {
        self.reopened_at.is_none()
    }

    pub fn reopen(&mut self, by: UserId, at: Timestamp) -> Result<(), DailyCloseError> {
        if !self.is_active() {
            return Err(DailyCloseError::AlreadyReopened(self.id));
        }
        self.reopened_at = Some(at);
        self.reopened_by = Some(by);
        Ok(())
    }
}
