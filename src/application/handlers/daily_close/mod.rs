//! Daily close handlers: closing the business day, reopening it, and the
//! read-only status and report queries.

mod close_day;
mod queries;
mod reopen_day;

pub use close_day::{CloseDayCommand, CloseDayHandler};
pub use queries::{
    CloseStatus, DailyCloseStatusHandler, DailyReport, DailyReportHandler, ListClosesHandler,
};
pub use reopen_day::ReopenDayHandler;
