//! Daily-close domain events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, DailyCloseId, EventId, Timestamp, UserId};

use super::DayTotals;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayClosed {
    pub event_id: EventId,
    pub close_id: DailyCloseId,
    pub business_date: NaiveDate,
    pub closed_by: UserId,
    pub totals: DayTotals,
    pub closed_at: Timestamp,
}

domain_event!(
    DayClosed,
    event_type = "daily_close.closed.v1",
    aggregate_id = close_id,
    aggregate_type = "DailyClose",
    occurred_at = closed_at,
    event_id = event_id
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReopened {
    pub event_id: EventId,
    pub close_id: DailyCloseId,
    pub business_date: NaiveDate,
    pub reopened_by: UserId,
    pub reopened_at: Timestamp,
}

domain_event!(
    DayReopened,
    event_type = "daily_close.reopened.v1",
    aggregate_id = close_id,
    aggregate_type = "DailyClose",
    occurred_at = reopened_at,
    event_id = event_id
);
