//! Daily close module - end-of-day lock and totals.

mod calendar;
mod close;
mod errors;
mod events;
mod gate;

pub use calendar::BusinessCalendar;
pub use close::{DailyClose, DayTotals};
pub use errors::DailyCloseError;
pub use events::{DayClosed, DayReopened};
pub use gate::{GateDecision, LockCategory, LockPolicy};
